//! # Common Test Utilities
//!
//! This module centralizes test harnesses and helper functions used across the
//! `subhook-server` integration tests. It includes:
//!
//! - `TestApp`: A full application harness that spawns a real server on a random port.
//!   `spawn` wires it to an in-memory `MockEngine`; `spawn_with_http_engine` loads a
//!   config file and talks to an `httpmock::MockServer` standing in for the engine.
//! - Helpers for building webhook bodies.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use reqwest::Client;
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr, sync::Arc};
use subhook::SubscriptionState;
use subhook_server::{
    config::{self, AppConfig, DispatchConfig, EngineConfig, SearchConfig},
    router,
    state::{build_app_state, AppState},
};
use subhook_test_utils::MockEngine;
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const WEBHOOK_SECRET: &str = "hook-secret";
pub const JWT_SECRET: &str = "test-jwt-secret";
pub const PREFIX: &str = "/api/v1/subscribe";

/// A configuration with test secrets and an engine URL that is never called.
pub fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        api_token: WEBHOOK_SECRET.to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        route_prefix: PREFIX.to_string(),
        engine: EngineConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            timeout_secs: 5,
        },
        dispatch: DispatchConfig::default(),
        search: SearchConfig {
            default_state: SubscriptionState::Running,
        },
    }
}

// --- Full Application Test Harness ---

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub engine: MockEngine,
    pub mock_server: Option<MockServer>,
    pub app_state: AppState,
    _config_dir: Option<TempDir>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server backed by a fresh `MockEngine`.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_engine(MockEngine::new()).await
    }

    pub async fn spawn_with_engine(engine: MockEngine) -> Result<Self> {
        let app_state = AppState::with_engine(test_config(), Arc::new(engine.clone()));
        Self::spawn_with_state(app_state, engine).await
    }

    /// Spawns the server from a YAML config file whose engine is an `httpmock` server.
    pub async fn spawn_with_http_engine() -> Result<Self> {
        let mock_server = MockServer::start_async().await;

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
api_token: "{WEBHOOK_SECRET}"
jwt_secret: "{JWT_SECRET}"
engine:
  base_url: "{}"
  api_key: "engine-key"
dispatch:
  max_concurrent_jobs: 2
"#,
            mock_server.url("/api/v1")
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = build_app_state(config).await?;

        let mut app = TestApp::spawn_with_state(app_state, MockEngine::new()).await?;
        app.mock_server = Some(mock_server);
        app._config_dir = Some(config_dir);
        Ok(app)
    }

    pub async fn spawn_with_state(app_state: AppState, engine: MockEngine) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            engine,
            mock_server: None,
            app_state: app_state_for_harness,
            _config_dir: None,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Full URL of a subscription endpoint, e.g. `url("/seerr")`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.address, PREFIX, path)
    }

    /// Posts a JSON webhook body with the correct shared secret.
    pub async fn post_webhook(&self, body: &Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/seerr"))
            .header("Authorization", WEBHOOK_SECRET)
            .json(body)
            .send()
            .await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

// --- Webhook bodies ---

pub fn movie_notification(title: &str, tmdb_id: u64) -> Value {
    json!({
        "notification_type": "MEDIA_APPROVED",
        "event": "Movie Request Approved",
        "subject": title,
        "message": "A new request has been approved.",
        "media": {
            "media_type": "movie",
            "tmdbId": tmdb_id,
            "status": "PENDING"
        },
        "request": {
            "request_id": "12",
            "requestedBy_username": "alice",
            "requestedBy_email": "alice@example.com"
        },
        "extra": []
    })
}

pub fn tv_notification(title: &str, tmdb_id: u64, seasons: &str) -> Value {
    json!({
        "notification_type": "MEDIA_AUTO_APPROVED",
        "event": "Series Request Automatically Approved",
        "subject": title,
        "media": {
            "media_type": "tv",
            "tmdbId": tmdb_id,
            "tvdbId": "81189"
        },
        "request": {
            "requestedBy_username": "bob"
        },
        "extra": [
            { "name": "Requested Seasons", "value": seasons }
        ]
    })
}
