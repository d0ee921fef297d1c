//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use matchgate::{
    CutoverConfig, CutoverManager, EntityRegistry, JsonFileStore, LearningCache, LegacySurfaces,
    MatchingAuthority, MetricsSnapshot, MockLegacyBackend, ProductionMetrics, ProductionRouter,
    SuggestionEngine, routing_bucket,
};

pub fn seeded_authority() -> Arc<MatchingAuthority> {
    let registry = EntityRegistry::new();
    for (id, name) in [
        (1, "ACME Corporation"),
        (2, "Banque Nationale d'Algérie"),
        (3, "Crédit Populaire d'Algérie"),
        (4, "Société Générale Algérie"),
    ] {
        registry
            .register_with_id(id, name, true)
            .expect("register entity");
    }
    Arc::new(MatchingAuthority::new(
        Arc::new(registry),
        Arc::new(LearningCache::new()),
    ))
}

pub fn legacy_backend() -> Arc<MockLegacyBackend> {
    Arc::new(MockLegacyBackend::new(vec![
        json!({ "supplier_id": 1, "supplier_name": "ACME Corporation", "score": 0.7 }),
    ]))
}

/// File-backed cutover and metrics documents in a temp dir.
pub struct FileBackedSetup {
    pub dir: TempDir,
}

impl FileBackedSetup {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// A fresh manager over the same file, as another process would open it.
    pub fn cutover(&self) -> CutoverManager {
        CutoverManager::new(Arc::new(JsonFileStore::<CutoverConfig>::new(
            self.dir.path().join("cutover.json"),
        )))
    }

    pub fn metrics(&self) -> ProductionMetrics {
        ProductionMetrics::new(Arc::new(JsonFileStore::<MetricsSnapshot>::new(
            self.dir.path().join("metrics.json"),
        )))
    }

    pub fn router(
        &self,
        authority: Arc<dyn SuggestionEngine>,
        legacy: Arc<MockLegacyBackend>,
    ) -> ProductionRouter {
        ProductionRouter::from_surfaces(
            authority,
            LegacySurfaces::new().with_suggestions(legacy),
            self.cutover(),
            self.metrics(),
        )
        .expect("router")
    }
}

/// Some input whose routing bucket falls in `range`.
pub fn input_in_bucket_range(range: std::ops::Range<u8>) -> String {
    (0..10_000)
        .map(|i| format!("ACME Co branch {i}"))
        .find(|s| range.contains(&routing_bucket(s)))
        .expect("some input lands in the range")
}
