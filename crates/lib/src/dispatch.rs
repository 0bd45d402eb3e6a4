//! # Job Dispatcher
//!
//! Hands each [`SubscriptionIntent`] to the subscription engine as an
//! independent background job and returns without waiting for any of them.
//!
//! ## Job lifecycle
//!
//! 1. `dispatch` assigns every intent a job id and spawns one Tokio task per
//!    intent, in intent order. It never awaits the tasks.
//! 2. Each job waits for an execution permit, so at most `max_concurrent_jobs`
//!    engine calls are in flight. Waiting happens inside the job, never in
//!    `dispatch`.
//! 3. A supervising task awaits each job and logs its outcome. Engine errors
//!    and panics end only the job that raised them.
//!
//! Completion order is not defined. There is no deduplication and no
//! cancellation.

use crate::{engine::SubscriptionEngine, types::SubscriptionIntent};
use std::sync::Arc;
use tokio::{sync::Semaphore, task::JoinError};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 8;

/// Proof that a batch of intents was handed off. Says nothing about completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// One id per intent, in intent order.
    pub job_ids: Vec<Uuid>,
}

impl DispatchReceipt {
    pub fn accepted(&self) -> usize {
        self.job_ids.len()
    }
}

/// Schedules subscription jobs on the current Tokio runtime.
#[derive(Clone, Debug)]
pub struct JobDispatcher {
    engine: Arc<dyn SubscriptionEngine>,
    permits: Arc<Semaphore>,
}

impl JobDispatcher {
    pub fn new(engine: Arc<dyn SubscriptionEngine>, max_concurrent_jobs: usize) -> Self {
        Self {
            engine,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    /// Spawns one job per intent and returns immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self, intents: Vec<SubscriptionIntent>) -> DispatchReceipt {
        let mut job_ids = Vec::with_capacity(intents.len());

        for intent in intents {
            let job_id = Uuid::new_v4();
            job_ids.push(job_id);

            let engine = self.engine.clone();
            let permits = self.permits.clone();
            let title = intent.title.clone();
            let season = intent.season;

            let job = tokio::spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    // Only reachable if the semaphore is closed, which this type never does.
                    Err(e) => {
                        warn!(%job_id, "Running job without a permit: {}", e);
                        return engine.create_subscription(&intent).await;
                    }
                };
                info!(%job_id, title = %intent.title, season = intent.season, kind = %intent.media_kind, "Starting subscription job.");
                engine.create_subscription(&intent).await
            });

            tokio::spawn(async move {
                match job.await {
                    Ok(Ok(())) => {
                        info!(%job_id, title = %title, season, "Subscription job completed.");
                    }
                    Ok(Err(e)) => {
                        error!(%job_id, title = %title, season, "Subscription job failed: {}", e);
                    }
                    Err(e) => log_join_error(job_id, &title, season, e),
                }
            });
        }

        info!(count = job_ids.len(), "Dispatched subscription jobs.");
        DispatchReceipt { job_ids }
    }
}

fn log_join_error(job_id: Uuid, title: &str, season: u32, err: JoinError) {
    if err.is_panic() {
        error!(%job_id, title, season, "Subscription job panicked.");
    } else {
        warn!(%job_id, title, season, "Subscription job was cancelled: {}", err);
    }
}
