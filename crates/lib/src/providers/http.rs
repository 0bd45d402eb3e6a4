use crate::{
    engine::{SubscriptionEngine, SubscriptionStore},
    errors::EngineError,
    types::{MediaKind, Subscription, SubscriptionIntent, SubscriptionState},
};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

// --- Engine request structures ---

#[derive(Serialize)]
struct CreateSubscriptionRequest<'a> {
    title: &'a str,
    media_type: MediaKind,
    tmdb_id: &'a str,
    season: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

// --- HTTP engine implementation ---

/// A client for a subscription engine exposed over REST.
#[derive(Clone, Debug)]
pub struct HttpSubscriptionEngine {
    client: ReqwestClient,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSubscriptionEngine {
    /// Creates a new `HttpSubscriptionEngine`.
    ///
    /// An empty `api_key` is treated as no key.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(EngineError::ClientBuild)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, EngineError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(EngineError::Request)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(EngineError::Api { status, message });
        }
        Ok(response)
    }
}

#[async_trait]
impl SubscriptionEngine for HttpSubscriptionEngine {
    async fn create_subscription(&self, intent: &SubscriptionIntent) -> Result<(), EngineError> {
        let body = CreateSubscriptionRequest {
            title: &intent.title,
            media_type: intent.media_kind,
            tmdb_id: &intent.external_id,
            season: intent.season,
            username: intent.requested_by.as_deref(),
        };
        debug!(title = %intent.title, season = intent.season, "Posting subscription to engine.");
        self.send(self.client.post(self.url("/subscriptions")).json(&body))
            .await?;
        Ok(())
    }

    async fn refresh_all(&self) -> Result<(), EngineError> {
        info!("Requesting subscription refresh from engine.");
        self.send(self.client.post(self.url("/subscriptions/refresh")))
            .await?;
        Ok(())
    }

    async fn search_all(&self, state: SubscriptionState) -> Result<(), EngineError> {
        info!(%state, "Requesting subscription search from engine.");
        self.send(
            self.client
                .post(self.url("/subscriptions/search"))
                .query(&[("state", state.code())]),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for HttpSubscriptionEngine {
    async fn list_all(&self) -> Result<Vec<Subscription>, EngineError> {
        let response = self.send(self.client.get(self.url("/subscriptions"))).await?;
        response
            .json::<Vec<Subscription>>()
            .await
            .map_err(EngineError::Deserialization)
    }
}
