//! # API Client
//!
//! This module provides a client for the admin endpoints of `subhook-server`.
//! It handles request construction, authentication, and response parsing.

use anyhow::{anyhow, bail, Result};
use keyring::Entry;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use subhook::{Subscription, SubscriptionState};
use tracing::info;

const KEYRING_SERVICE: &str = "subhook-cli";
const KEYRING_USERNAME: &str = "admin";

/// The body returned by the refresh and search endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Where the admin token lives between invocations.
pub fn keyring_entry() -> Result<Entry> {
    Ok(Entry::new(KEYRING_SERVICE, KEYRING_USERNAME)?)
}

/// Stores `token` in the OS keychain, replacing any previous one.
pub fn store_token(token: &str) -> Result<()> {
    keyring_entry()?.set_password(token)?;
    Ok(())
}

/// The client for making API calls to the `subhook-server`.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Creates a client that authenticates with `token`.
    pub fn new(base_url: &str, token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Creates a client using the token saved by `login`.
    pub fn from_keyring(base_url: &str) -> Result<Self> {
        let token = keyring_entry()?.get_password().map_err(|e| {
            anyhow!("You are not logged in. Please run `subhook login <token>` first. Error: {e}")
        })?;
        Ok(Self::new(base_url, token))
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request.bearer_auth(&self.token).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Failed to {action}. Server responded with {status}: {error_text}");
        }
        Ok(response)
    }

    /// Fetches every stored subscription.
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let url = self.base_url.clone();
        info!("Fetching subscriptions from: {}", url);

        let response = self
            .send(self.client.get(&url), "list subscriptions")
            .await?;
        Ok(response.json().await?)
    }

    /// Asks the server to run a refresh pass.
    pub async fn refresh(&self) -> Result<SuccessResponse> {
        let url = format!("{}/refresh", self.base_url);
        info!("Triggering refresh at: {}", url);

        let response = self
            .send(self.client.get(&url), "trigger refresh")
            .await?;
        Ok(response.json().await?)
    }

    /// Asks the server to run a search pass, over `state` or the server default.
    pub async fn search(&self, state: Option<SubscriptionState>) -> Result<SuccessResponse> {
        let url = format!("{}/search", self.base_url);
        info!(?state, "Triggering search at: {}", url);

        let mut request = self.client.get(&url);
        if let Some(state) = state {
            request = request.query(&[("state", state.code())]);
        }

        let response = self.send(request, "trigger search").await?;
        Ok(response.json().await?)
    }
}
