use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::cutover::CutoverConfig;
use crate::engine::{BlockingEngine, EngineError, FailingEngine, SlowEngine, StaticEngine};
use crate::legacy::MockLegacyBackend;
use crate::store::MemoryDocumentStore;

struct Harness {
    router: ProductionRouter,
    authority: Arc<StaticEngine>,
    legacy: Arc<StaticEngine>,
}

fn metrics() -> ProductionMetrics {
    ProductionMetrics::new(Arc::new(MemoryDocumentStore::new()))
}

fn cutover_at(enabled: bool, percentage: u8) -> CutoverManager {
    CutoverManager::new(Arc::new(MemoryDocumentStore::with_document(CutoverConfig {
        enabled,
        rollout_percentage: percentage,
        ..CutoverConfig::default()
    })))
}

fn harness(enabled: bool, percentage: u8) -> Harness {
    let authority = Arc::new(StaticEngine::single("authority", 1, "ACME Corporation", 95.0));
    let legacy = Arc::new(StaticEngine::single("legacy", 2, "Acme (legacy)", 80.0));
    let router = ProductionRouter::new(
        authority.clone(),
        legacy.clone(),
        cutover_at(enabled, percentage),
        metrics(),
    );
    Harness {
        router,
        authority,
        legacy,
    }
}

#[tokio::test]
async fn test_disabled_routes_to_legacy() {
    let h = harness(false, 100);

    let suggestions = h.router.get_suggestions("ACME Co").await.expect("route");
    assert_eq!(suggestions[0].entity_id, 2);
    assert_eq!(h.authority.calls(), 0);
    assert_eq!(h.legacy.calls(), 1);

    let stats = h.router.metrics().get_stats();
    assert_eq!(stats.legacy.total_requests, 1);
    assert_eq!(stats.authority.total_requests, 0);
}

#[tokio::test]
async fn test_full_rollout_routes_to_authority() {
    let h = harness(true, 100);

    for i in 0..20 {
        let suggestions = h
            .router
            .get_suggestions(&format!("input {i}"))
            .await
            .expect("route");
        assert_eq!(suggestions[0].entity_id, 1);
    }
    assert_eq!(h.legacy.calls(), 0);

    let stats = h.router.metrics().get_stats();
    assert_eq!(stats.authority.total_requests, 20);
    assert_eq!(stats.authority.total_results, 20);
}

#[tokio::test]
async fn test_authority_failure_falls_back_to_legacy() {
    let legacy = Arc::new(StaticEngine::single("legacy", 2, "Acme (legacy)", 80.0));
    let router = ProductionRouter::new(
        Arc::new(FailingEngine::new("authority", "index unavailable")),
        legacy.clone(),
        cutover_at(true, 100),
        metrics(),
    );

    for i in 1..=5u64 {
        let suggestions = router.get_suggestions("ACME Co").await.expect("fallback");
        assert_eq!(suggestions[0].entity_id, 2);
        assert!(
            suggestions.iter().all(|s| !s.reason.contains("index unavailable")),
            "engine error text must not leak into suggestions"
        );
        assert_eq!(router.metrics().snapshot().fallbacks.total, i);
    }

    let snapshot = router.metrics().snapshot();
    assert_eq!(snapshot.authority.total_errors, 5);
    assert_eq!(snapshot.legacy.total_requests, 5);
    assert!(
        snapshot.authority.recent_errors[0]
            .message
            .contains("index unavailable")
    );
    assert_eq!(legacy.calls(), 5);
}

#[tokio::test]
async fn test_authority_timeout_falls_back_to_legacy() {
    let slow = SlowEngine::new(
        StaticEngine::single("authority", 1, "ACME Corporation", 95.0),
        Duration::from_millis(200),
    );
    let router = ProductionRouter::new(
        Arc::new(slow),
        Arc::new(StaticEngine::single("legacy", 2, "Acme (legacy)", 80.0)),
        cutover_at(true, 100),
        metrics(),
    )
    .with_authority_timeout(Duration::from_millis(20));

    let suggestions = router.get_suggestions("ACME Co").await.expect("fallback");
    assert_eq!(suggestions[0].entity_id, 2);

    let snapshot = router.metrics().snapshot();
    assert_eq!(snapshot.fallbacks.total, 1);
    assert!(snapshot.authority.recent_errors[0].message.contains("timed out"));
}

#[tokio::test]
async fn test_blocking_authority_past_deadline_falls_back() {
    let blocking = BlockingEngine::new(
        StaticEngine::single("authority", 1, "ACME Corporation", 95.0),
        Duration::from_millis(150),
    );
    let legacy = Arc::new(StaticEngine::single("legacy", 2, "Acme (legacy)", 80.0));
    let router = ProductionRouter::new(
        Arc::new(blocking),
        legacy.clone(),
        cutover_at(true, 100),
        metrics(),
    )
    .with_authority_timeout(Duration::from_millis(25));

    let suggestions = router.get_suggestions("ACME Co").await.expect("fallback");
    assert_eq!(suggestions[0].entity_id, 2);
    assert_eq!(legacy.calls(), 1);

    let snapshot = router.metrics().snapshot();
    assert_eq!(snapshot.authority.total_requests, 0);
    assert_eq!(snapshot.authority.total_errors, 1);
    assert_eq!(snapshot.fallbacks.total, 1);
    assert!(snapshot.authority.recent_errors[0].message.contains("timed out"));
}

#[tokio::test]
async fn test_blocking_authority_within_deadline_succeeds() {
    let blocking = BlockingEngine::new(
        StaticEngine::single("authority", 1, "ACME Corporation", 95.0),
        Duration::from_millis(5),
    );
    let router = ProductionRouter::new(
        Arc::new(blocking),
        Arc::new(StaticEngine::single("legacy", 2, "Acme (legacy)", 80.0)),
        cutover_at(true, 100),
        metrics(),
    )
    .with_authority_timeout(Duration::from_secs(5));

    let suggestions = router.get_suggestions("ACME Co").await.expect("route");
    assert_eq!(suggestions[0].entity_id, 1);
    assert_eq!(router.metrics().snapshot().fallbacks.total, 0);
}

#[tokio::test]
async fn test_legacy_failure_propagates_when_chosen() {
    let router = ProductionRouter::new(
        Arc::new(StaticEngine::single("authority", 1, "ACME Corporation", 95.0)),
        Arc::new(FailingEngine::new("legacy", "db down")),
        cutover_at(false, 0),
        metrics(),
    );

    let err = router.get_suggestions("ACME Co").await.expect_err("legacy fails");
    assert_eq!(err.engine_error(), &EngineError::failed("legacy", "db down"));

    let snapshot = router.metrics().snapshot();
    assert_eq!(snapshot.legacy.total_errors, 1);
    assert_eq!(snapshot.fallbacks.total, 0);
}

#[tokio::test]
async fn test_double_failure_propagates_legacy_error() {
    let router = ProductionRouter::new(
        Arc::new(FailingEngine::new("authority", "boom")),
        Arc::new(FailingEngine::new("legacy", "db down")),
        cutover_at(true, 100),
        metrics(),
    );

    let err = router.get_suggestions("ACME Co").await.expect_err("both fail");
    assert_eq!(err.engine_error(), &EngineError::failed("legacy", "db down"));
    assert_eq!(router.metrics().snapshot().fallbacks.total, 1);
}

#[tokio::test]
async fn test_empty_result_is_a_success() {
    let router = ProductionRouter::new(
        Arc::new(StaticEngine::new("authority", vec![])),
        Arc::new(StaticEngine::new("legacy", vec![])),
        cutover_at(true, 100),
        metrics(),
    );

    let suggestions = router.get_suggestions("nothing").await.expect("route");
    assert!(suggestions.is_empty());

    let stats = router.metrics().get_stats();
    assert_eq!(stats.authority.total_requests, 1);
    assert_eq!(stats.fallbacks.total, 0);
}

#[tokio::test]
async fn test_rollback_takes_effect_on_next_request() {
    let h = harness(true, 100);
    h.router.get_suggestions("ACME Co").await.expect("route");
    assert_eq!(h.authority.calls(), 1);

    h.router
        .cutover()
        .emergency_rollback("manual")
        .expect("rollback");
    h.router.get_suggestions("ACME Co").await.expect("route");

    assert_eq!(h.authority.calls(), 1);
    assert_eq!(h.legacy.calls(), 1);
}

#[tokio::test]
async fn test_from_surfaces_uses_resolved_legacy_entry_point() {
    let backend = Arc::new(MockLegacyBackend::new(vec![
        json!({ "bank_id": 9, "bank_name": "Banque Nationale", "similarity": 0.9 }),
    ]));
    let router = ProductionRouter::from_surfaces(
        Arc::new(StaticEngine::new("authority", vec![])),
        LegacySurfaces::new().with_find(backend.clone()),
        cutover_at(false, 0),
        metrics(),
    )
    .expect("router");

    let suggestions = router.get_suggestions("bna").await.expect("route");
    assert_eq!(suggestions[0].entity_id, 9);
    assert!((suggestions[0].score - 90.0).abs() < 1e-9);
    assert_eq!(backend.calls(), 1);
}

#[test]
fn test_from_surfaces_requires_an_entry_point() {
    let err = ProductionRouter::from_surfaces(
        Arc::new(StaticEngine::new("authority", vec![])),
        LegacySurfaces::new(),
        cutover_at(false, 0),
        metrics(),
    )
    .expect_err("no entry point");
    assert_eq!(err.engine_error(), &EngineError::NoLegacyEntryPoint);
}

#[tokio::test]
async fn test_from_config_persists_under_data_dir() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        authority_timeout: Duration::from_millis(50),
        ..Config::default()
    };

    let router = ProductionRouter::from_config(
        &config,
        Arc::new(StaticEngine::single("authority", 1, "ACME Corporation", 95.0)),
        LegacySurfaces::new().with_suggestions(Arc::new(MockLegacyBackend::new(vec![]))),
    )
    .expect("router");

    router.cutover().enable().expect("enable");
    router.cutover().set_rollout_percentage(100).expect("100%");
    let suggestions = router.get_suggestions("ACME").await.expect("route");
    assert_eq!(suggestions[0].entity_id, 1);

    assert!(config.cutover_path().exists());
    assert!(config.metrics_path().exists());
}
