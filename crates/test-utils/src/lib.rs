use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use core_access::{issue_token, ADMIN_ROLE};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subhook::{
    EngineError, Subscription, SubscriptionEngine, SubscriptionIntent, SubscriptionState,
    SubscriptionStore,
};

// --- Tokens ---

/// Mints a one-hour admin token for `subject`.
pub fn admin_token(jwt_secret: &str, subject: &str) -> String {
    issue_token(jwt_secret, subject, ADMIN_ROLE, ChronoDuration::hours(1)).unwrap()
}

/// Mints a one-hour token with an arbitrary role.
pub fn token_with_role(jwt_secret: &str, subject: &str, role: &str) -> String {
    issue_token(jwt_secret, subject, role, ChronoDuration::hours(1)).unwrap()
}

// --- Mock Subscription Engine ---

#[derive(Debug, Default)]
struct Recorded {
    attempts: Vec<SubscriptionIntent>,
    created: Vec<SubscriptionIntent>,
    refreshes: usize,
    searches: Vec<SubscriptionState>,
    lists: usize,
}

/// An in-memory engine and store that records every call.
///
/// Behaviour can be programmed per season: fail with an `EngineError`, or panic.
#[derive(Clone, Debug, Default)]
pub struct MockEngine {
    recorded: Arc<Mutex<Recorded>>,
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
    failing_seasons: Arc<Mutex<HashSet<u32>>>,
    panicking_seasons: Arc<Mutex<HashSet<u32>>>,
    fail_admin_calls: Arc<Mutex<bool>>,
    delay: Option<Duration>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `create_subscription` call sleeps this long before recording.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_on_season(&self, season: u32) {
        self.failing_seasons.lock().unwrap().insert(season);
    }

    pub fn panic_on_season(&self, season: u32) {
        self.panicking_seasons.lock().unwrap().insert(season);
    }

    /// Makes `refresh_all`, `search_all` and `list_all` return an error.
    pub fn fail_admin_calls(&self) {
        *self.fail_admin_calls.lock().unwrap() = true;
    }

    pub fn set_subscriptions(&self, subscriptions: Vec<Subscription>) {
        *self.subscriptions.lock().unwrap() = subscriptions;
    }

    /// Intents that completed successfully, in completion order.
    pub fn created(&self) -> Vec<SubscriptionIntent> {
        self.recorded.lock().unwrap().created.clone()
    }

    /// Every intent the engine was asked to create, in call order.
    pub fn attempts(&self) -> Vec<SubscriptionIntent> {
        self.recorded.lock().unwrap().attempts.clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.recorded.lock().unwrap().refreshes
    }

    pub fn searches(&self) -> Vec<SubscriptionState> {
        self.recorded.lock().unwrap().searches.clone()
    }

    pub fn list_count(&self) -> usize {
        self.recorded.lock().unwrap().lists
    }

    /// Polls until `count` intents have been created, or fails after `timeout`.
    pub async fn wait_for_created(
        &self,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<SubscriptionIntent>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let created = self.created();
            if created.len() >= count {
                return Ok(created);
            }
            if tokio::time::Instant::now() >= deadline {
                bail!(
                    "timed out waiting for {count} created subscriptions, saw {}",
                    created.len()
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Waits a fixed amount of time and returns the attempts seen so far.
    ///
    /// Used to assert that nothing was dispatched.
    pub async fn settle(&self, wait: Duration) -> Vec<SubscriptionIntent> {
        tokio::time::sleep(wait).await;
        self.attempts()
    }

    fn admin_failure(&self) -> Result<(), EngineError> {
        if *self.fail_admin_calls.lock().unwrap() {
            Err(EngineError::Api {
                status: 503,
                message: "engine unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SubscriptionEngine for MockEngine {
    async fn create_subscription(&self, intent: &SubscriptionIntent) -> Result<(), EngineError> {
        self.recorded.lock().unwrap().attempts.push(intent.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.panicking_seasons.lock().unwrap().contains(&intent.season) {
            panic!("mock engine panicked on season {}", intent.season);
        }
        if self.failing_seasons.lock().unwrap().contains(&intent.season) {
            return Err(EngineError::Internal(format!(
                "mock engine failed on season {}",
                intent.season
            )));
        }

        self.recorded.lock().unwrap().created.push(intent.clone());
        Ok(())
    }

    async fn refresh_all(&self) -> Result<(), EngineError> {
        self.recorded.lock().unwrap().refreshes += 1;
        self.admin_failure()
    }

    async fn search_all(&self, state: SubscriptionState) -> Result<(), EngineError> {
        self.recorded.lock().unwrap().searches.push(state);
        self.admin_failure()
    }
}

#[async_trait]
impl SubscriptionStore for MockEngine {
    async fn list_all(&self) -> Result<Vec<Subscription>, EngineError> {
        self.recorded.lock().unwrap().lists += 1;
        self.admin_failure()?;
        Ok(self.subscriptions.lock().unwrap().clone())
    }
}
