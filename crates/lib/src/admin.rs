//! # Admin Operations
//!
//! Thin pass-throughs to the subscription engine for the administrative
//! endpoints. Every operation runs the admin check first and never reaches the
//! engine when it fails. Engine errors are returned unchanged; retrying is the
//! engine's business.

use crate::{
    engine::{SubscriptionEngine, SubscriptionStore},
    errors::EngineError,
    types::{Subscription, SubscriptionState},
};
use core_access::{authorize_admin, AccessError, Principal};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Clone, Debug)]
pub struct AdminOperations {
    store: Arc<dyn SubscriptionStore>,
    engine: Arc<dyn SubscriptionEngine>,
}

impl AdminOperations {
    pub fn new(store: Arc<dyn SubscriptionStore>, engine: Arc<dyn SubscriptionEngine>) -> Self {
        Self { store, engine }
    }

    pub async fn list(&self, principal: Option<&Principal>) -> Result<Vec<Subscription>, AdminError> {
        let admin = authorize_admin(principal)?;
        info!(admin = %admin.subject, "Listing subscriptions.");
        Ok(self.store.list_all().await?)
    }

    /// Returns once the engine's refresh routine has returned.
    pub async fn refresh_all(&self, principal: Option<&Principal>) -> Result<(), AdminError> {
        let admin = authorize_admin(principal)?;
        info!(admin = %admin.subject, "Triggering subscription refresh.");
        Ok(self.engine.refresh_all().await?)
    }

    /// Returns once the engine's search routine has returned.
    pub async fn search_all(
        &self,
        principal: Option<&Principal>,
        state: SubscriptionState,
    ) -> Result<(), AdminError> {
        let admin = authorize_admin(principal)?;
        info!(admin = %admin.subject, %state, "Triggering subscription search.");
        Ok(self.engine.search_all(state).await?)
    }
}
