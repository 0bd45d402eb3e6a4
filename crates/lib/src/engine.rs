//! # Subscription Engine Contracts
//!
//! The subscription engine owns media lookup, matching, persistence and the
//! periodic scans. This crate only ever talks to it through these two traits so
//! the webhook and admin paths can be exercised against any implementation.

use crate::{
    errors::EngineError,
    types::{Subscription, SubscriptionIntent, SubscriptionState},
};
use async_trait::async_trait;
use std::fmt::Debug;

/// Executes subscription work.
///
/// Implementations must tolerate concurrent, out-of-order `create_subscription`
/// calls for the same title with different seasons, and for identical intents.
#[async_trait]
pub trait SubscriptionEngine: Send + Sync + Debug {
    async fn create_subscription(&self, intent: &SubscriptionIntent) -> Result<(), EngineError>;

    /// Runs a refresh pass over every subscription.
    async fn refresh_all(&self) -> Result<(), EngineError>;

    /// Runs a search pass over the subscriptions in `state`.
    async fn search_all(&self, state: SubscriptionState) -> Result<(), EngineError>;
}

/// Read access to stored subscriptions.
#[async_trait]
pub trait SubscriptionStore: Send + Sync + Debug {
    async fn list_all(&self) -> Result<Vec<Subscription>, EngineError>;
}
