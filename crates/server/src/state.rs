//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the credential gates, the job
//! dispatcher and the admin operations, all wired to one subscription engine.

use crate::config::AppConfig;
use core_access::{AuthProvider, JwtAuthProvider, WebhookGate};
use std::{sync::Arc, time::Duration};
use subhook::{
    providers::HttpSubscriptionEngine, AdminOperations, JobDispatcher, SubscriptionEngine,
    SubscriptionStore,
};

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<AppConfig>,
    /// Checks the shared secret on webhook calls.
    pub webhook_gate: Arc<WebhookGate>,
    /// Resolves admin bearer tokens into principals.
    pub auth_provider: Arc<dyn AuthProvider>,
    /// Fans webhook intents out into background jobs.
    pub dispatcher: JobDispatcher,
    /// List, refresh and search pass-throughs.
    pub admin: AdminOperations,
}

impl AppState {
    /// Wires the state around an already constructed engine.
    pub fn with_engine<E>(config: AppConfig, engine: Arc<E>) -> Self
    where
        E: SubscriptionEngine + SubscriptionStore + 'static,
    {
        let engine_dyn: Arc<dyn SubscriptionEngine> = engine.clone();
        let store_dyn: Arc<dyn SubscriptionStore> = engine;

        Self {
            webhook_gate: Arc::new(WebhookGate::new(config.api_token.clone())),
            auth_provider: Arc::new(JwtAuthProvider::new(&config.jwt_secret)),
            dispatcher: JobDispatcher::new(
                engine_dyn.clone(),
                config.dispatch.max_concurrent_jobs,
            ),
            admin: AdminOperations::new(store_dyn, engine_dyn),
            config: Arc::new(config),
        }
    }
}

/// Builds the shared application state from the configuration.
///
/// The subscription engine is reached over HTTP at `engine.base_url`.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let engine = HttpSubscriptionEngine::new(
        config.engine.base_url.clone(),
        config.engine.api_key.clone(),
        Duration::from_secs(config.engine.timeout_secs),
    )?;
    tracing::info!(engine_url = %config.engine.base_url, "Initialized subscription engine client.");

    Ok(AppState::with_engine(config, Arc::new(engine)))
}
