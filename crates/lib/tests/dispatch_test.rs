//! # Job Dispatcher Tests
//!
//! Verifies that dispatch is non-blocking, that every intent becomes its own
//! job, and that one failing or panicking job does not affect its siblings.

use anyhow::Result;
use std::{sync::Arc, time::Duration};
use subhook::{JobDispatcher, SubscriptionIntent};
use subhook_test_utils::MockEngine;

const WAIT: Duration = Duration::from_secs(5);

fn seasons(title: &str, seasons: &[u32]) -> Vec<SubscriptionIntent> {
    seasons
        .iter()
        .map(|s| SubscriptionIntent::tv_season(title, "1396", *s, Some("alice")))
        .collect()
}

fn sorted_seasons(intents: &[SubscriptionIntent]) -> Vec<u32> {
    let mut seasons: Vec<u32> = intents.iter().map(|i| i.season).collect();
    seasons.sort_unstable();
    seasons
}

#[tokio::test]
async fn test_dispatch_runs_every_intent() -> Result<()> {
    let engine = MockEngine::new();
    let dispatcher = JobDispatcher::new(Arc::new(engine.clone()), 4);

    let receipt = dispatcher.dispatch(seasons("Breaking Bad", &[1, 2, 3]));
    assert_eq!(receipt.accepted(), 3);

    let created = engine.wait_for_created(3, WAIT).await?;
    assert_eq!(sorted_seasons(&created), vec![1, 2, 3]);
    assert!(created.iter().all(|i| i.title == "Breaking Bad"));
    Ok(())
}

#[tokio::test]
async fn test_dispatch_returns_before_jobs_complete() -> Result<()> {
    let engine = MockEngine::new().with_delay(Duration::from_millis(300));
    let dispatcher = JobDispatcher::new(Arc::new(engine.clone()), 4);

    let started = tokio::time::Instant::now();
    let receipt = dispatcher.dispatch(seasons("Slow Show", &[1, 2]));
    assert!(started.elapsed() < Duration::from_millis(300));
    assert_eq!(receipt.accepted(), 2);
    assert!(engine.created().is_empty(), "no job should have finished yet");

    engine.wait_for_created(2, WAIT).await?;
    Ok(())
}

#[tokio::test]
async fn test_failing_job_does_not_affect_siblings() -> Result<()> {
    let engine = MockEngine::new();
    engine.fail_on_season(2);
    let dispatcher = JobDispatcher::new(Arc::new(engine.clone()), 4);

    dispatcher.dispatch(seasons("Lost", &[1, 2, 3]));

    let created = engine.wait_for_created(2, WAIT).await?;
    assert_eq!(sorted_seasons(&created), vec![1, 3]);
    assert_eq!(sorted_seasons(&engine.attempts()), vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_panicking_job_does_not_affect_siblings() -> Result<()> {
    let engine = MockEngine::new();
    engine.panic_on_season(1);
    let dispatcher = JobDispatcher::new(Arc::new(engine.clone()), 4);

    dispatcher.dispatch(seasons("Fringe", &[1, 2, 3]));

    let created = engine.wait_for_created(2, WAIT).await?;
    assert_eq!(sorted_seasons(&created), vec![2, 3]);

    // The dispatcher keeps working after a panic.
    dispatcher.dispatch(seasons("Fringe", &[4]));
    let created = engine.wait_for_created(3, WAIT).await?;
    assert_eq!(sorted_seasons(&created), vec![2, 3, 4]);
    Ok(())
}

#[tokio::test]
async fn test_dispatch_does_not_deduplicate() -> Result<()> {
    let engine = MockEngine::new();
    let dispatcher = JobDispatcher::new(Arc::new(engine.clone()), 2);

    let first = dispatcher.dispatch(seasons("Dark", &[1, 1]));
    let second = dispatcher.dispatch(seasons("Dark", &[1, 1]));

    let created = engine.wait_for_created(4, WAIT).await?;
    assert_eq!(sorted_seasons(&created), vec![1, 1, 1, 1]);
    assert!(first.job_ids.iter().all(|id| !second.job_ids.contains(id)));
    Ok(())
}

#[tokio::test]
async fn test_concurrency_limit_still_completes_all_jobs() -> Result<()> {
    let engine = MockEngine::new().with_delay(Duration::from_millis(20));
    // A limit of zero is clamped to one permit.
    let dispatcher = JobDispatcher::new(Arc::new(engine.clone()), 0);

    let receipt = dispatcher.dispatch(seasons("The Wire", &[1, 2, 3, 4, 5]));
    assert_eq!(receipt.accepted(), 5);

    let created = engine.wait_for_created(5, WAIT).await?;
    assert_eq!(sorted_seasons(&created), vec![1, 2, 3, 4, 5]);
    Ok(())
}

#[tokio::test]
async fn test_empty_dispatch_schedules_nothing() {
    let engine = MockEngine::new();
    let dispatcher = JobDispatcher::new(Arc::new(engine.clone()), 4);

    let receipt = dispatcher.dispatch(Vec::new());

    assert_eq!(receipt.accepted(), 0);
    assert!(engine.settle(Duration::from_millis(50)).await.is_empty());
}
