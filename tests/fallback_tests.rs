//! Authority failure handling through the production router.

mod common;

use std::sync::Arc;
use std::time::Duration;

use matchgate::{
    CutoverConfig, CutoverManager, FailingEngine, MemoryDocumentStore, ProductionMetrics,
    ProductionRouter, SlowEngine, StaticEngine,
};

use common::{FileBackedSetup, legacy_backend};

#[tokio::test]
async fn test_every_failed_authority_call_counts_one_fallback() {
    let setup = FileBackedSetup::new();
    let legacy = legacy_backend();
    let router = setup.router(
        Arc::new(FailingEngine::new("authority", "matching index offline")),
        legacy.clone(),
    );
    router.cutover().enable().expect("enable");
    router.cutover().set_rollout_percentage(100).expect("100%");

    for i in 1..=10u64 {
        let suggestions = router
            .get_suggestions(&format!("supplier {i}"))
            .await
            .expect("legacy serves the request");
        assert_eq!(suggestions[0].entity_id, 1);
        assert_eq!(setup.metrics().snapshot().fallbacks.total, i);
    }

    let stats = setup.metrics().get_stats();
    assert_eq!(stats.authority.total_errors, 10);
    assert_eq!(stats.legacy.total_requests, 10);
    assert_eq!(stats.fallback_rate_percent, 100.0);
    assert!(!setup.metrics().meets_rollout_criteria());
    assert_eq!(legacy.calls(), 10);
}

#[tokio::test]
async fn test_timeouts_are_treated_as_failures() {
    let setup = FileBackedSetup::new();
    let slow = SlowEngine::new(
        StaticEngine::single("authority", 1, "ACME Corporation", 99.0),
        Duration::from_millis(250),
    );
    let router = setup
        .router(Arc::new(slow), legacy_backend())
        .with_authority_timeout(Duration::from_millis(25));
    router.cutover().enable().expect("enable");
    router.cutover().set_rollout_percentage(100).expect("100%");

    let suggestions = router.get_suggestions("ACME").await.expect("fallback");
    assert_eq!(suggestions[0].reason, "Legacy match");

    let snapshot = setup.metrics().snapshot();
    assert_eq!(snapshot.fallbacks.total, 1);
    assert_eq!(snapshot.authority.total_requests, 0);
    assert_eq!(snapshot.authority.total_errors, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fallbacks_lose_no_increments() {
    let cutover = CutoverManager::new(Arc::new(MemoryDocumentStore::with_document(
        CutoverConfig {
            enabled: true,
            rollout_percentage: 100,
            ..CutoverConfig::default()
        },
    )));
    let metrics = ProductionMetrics::new(Arc::new(MemoryDocumentStore::new()));
    let router = Arc::new(ProductionRouter::new(
        Arc::new(FailingEngine::new("authority", "boom")),
        Arc::new(StaticEngine::single("legacy", 7, "Legacy Co", 60.0)),
        cutover,
        metrics,
    ));

    let tasks: Vec<_> = (0..8)
        .map(|t| {
            let router = router.clone();
            tokio::spawn(async move {
                for i in 0..10 {
                    router
                        .get_suggestions(&format!("task {t} input {i}"))
                        .await
                        .expect("fallback");
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.expect("task");
    }

    let snapshot = router.metrics().snapshot();
    assert_eq!(snapshot.fallbacks.total, 80);
    assert_eq!(snapshot.authority.total_errors, 80);
    assert_eq!(snapshot.legacy.total_requests, 80);
}

#[test]
fn test_fallback_counts_survive_independent_metrics_handles() {
    let setup = FileBackedSetup::new();

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let metrics = setup.metrics();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    metrics.record_fallback().expect("record");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker");
    }

    assert_eq!(setup.metrics().snapshot().fallbacks.total, 400);
}
