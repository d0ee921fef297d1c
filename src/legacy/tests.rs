use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::engine::{EngineError, SuggestionEngine};
use crate::matching::{AnchorType, SuggestionSource};

fn acme_record() -> serde_json::Value {
    json!({ "id": 7, "name": "ACME Corporation", "score": 0.82 })
}

#[test]
fn test_reconcile_rescales_fractional_scores() {
    let dto = reconcile_record(&acme_record()).expect("usable record");

    assert_eq!(dto.entity_id, 7);
    assert_eq!(dto.name, "ACME Corporation");
    assert!((dto.score - 82.0).abs() < 1e-9);
    assert_eq!(dto.source, SuggestionSource::Fuzzy);
    assert_eq!(dto.anchor_type, AnchorType::Fuzzy);
    assert_eq!(dto.reason, "Legacy match");
}

#[test]
fn test_reconcile_accepts_field_aliases() {
    let record = json!({
        "supplier_id": "12",
        "supplier_name": " Banque Nationale ",
        "confidence": 91,
        "source": "alias",
        "matched_anchor": "BNA",
    });
    let dto = reconcile_record(&record).expect("usable record");

    assert_eq!(dto.entity_id, 12);
    assert_eq!(dto.name, "Banque Nationale");
    assert_eq!(dto.score, 91.0);
    assert_eq!(dto.source, SuggestionSource::Alias);
    assert_eq!(dto.anchor_type, AnchorType::Alias);
    assert_eq!(dto.matched_anchor, "BNA");
}

#[test]
fn test_reconcile_prefers_earlier_field_names() {
    let record = json!({ "bank_id": 2, "entity_id": 1, "bank_name": "B", "official_name": "A" });
    let dto = reconcile_record(&record).expect("usable record");

    assert_eq!(dto.entity_id, 1);
    assert_eq!(dto.name, "A");
}

#[test]
fn test_reconcile_clamps_and_defaults_score() {
    let over = reconcile_record(&json!({ "id": 1, "name": "x", "similarity": 250 }))
        .expect("record");
    assert_eq!(over.score, 100.0);

    let missing = reconcile_record(&json!({ "id": 1, "name": "x" })).expect("record");
    assert_eq!(missing.score, 0.0);
}

#[test]
fn test_reconcile_drops_unusable_records() {
    assert!(reconcile_record(&json!({ "name": "no id" })).is_none());
    assert!(reconcile_record(&json!({ "id": 3 })).is_none());
    assert!(reconcile_record(&json!({ "id": -3, "name": "negative" })).is_none());
    assert!(reconcile_record(&json!({ "id": 3, "name": "   " })).is_none());

    let kept = reconcile_records(&[json!({ "id": 1 }), acme_record(), json!("junk")]);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].entity_id, 7);
}

#[test]
fn test_resolve_follows_preference_order() {
    let backend = Arc::new(MockLegacyBackend::new(vec![acme_record()]));

    let all = LegacySurfaces::new()
        .with_suggestions(backend.clone())
        .with_find(backend.clone())
        .with_supplier_candidates(backend.clone());
    assert_eq!(
        LegacyAdapter::resolve(all).expect("resolve").entry_point(),
        LegacyEntryPoint::GetSuggestions
    );

    let find_and_candidates = LegacySurfaces::new()
        .with_find(backend.clone())
        .with_supplier_candidates(backend.clone());
    assert_eq!(
        LegacyAdapter::resolve(find_and_candidates)
            .expect("resolve")
            .entry_point(),
        LegacyEntryPoint::Find
    );

    let candidates_only = LegacySurfaces::new().with_supplier_candidates(backend);
    assert_eq!(
        LegacyAdapter::resolve(candidates_only)
            .expect("resolve")
            .entry_point(),
        LegacyEntryPoint::SupplierCandidates
    );
}

#[test]
fn test_resolve_without_entry_point_fails() {
    let err = LegacyAdapter::resolve(LegacySurfaces::new()).expect_err("nothing to bind");
    assert_eq!(err, EngineError::NoLegacyEntryPoint);
}

#[tokio::test]
async fn test_supplier_candidates_payload_is_unwrapped() {
    let backend = Arc::new(MockLegacyBackend::new(vec![acme_record()]));
    let adapter =
        LegacyAdapter::resolve(LegacySurfaces::new().with_supplier_candidates(backend.clone()))
            .expect("resolve");

    let suggestions = adapter.suggest("acme").await.expect("suggest");
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].entity_id, 7);
    assert_eq!(backend.calls(), 1);
    assert_eq!(adapter.name(), "legacy");
}

#[tokio::test]
async fn test_bound_entry_point_is_the_only_one_called() {
    let preferred = Arc::new(MockLegacyBackend::new(vec![acme_record()]));
    let other = Arc::new(MockLegacyBackend::new(vec![]));
    let adapter = LegacyAdapter::resolve(
        LegacySurfaces::new()
            .with_suggestions(preferred.clone())
            .with_find(other.clone()),
    )
    .expect("resolve");

    for _ in 0..3 {
        adapter.suggest("acme").await.expect("suggest");
    }
    assert_eq!(preferred.calls(), 3);
    assert_eq!(other.calls(), 0);
}

#[tokio::test]
async fn test_backend_failure_is_reported_as_engine_error() {
    let backend = Arc::new(MockLegacyBackend::failing("db down"));
    let adapter =
        LegacyAdapter::resolve(LegacySurfaces::new().with_find(backend)).expect("resolve");

    let err = adapter.suggest("acme").await.expect_err("backend fails");
    assert_eq!(err, EngineError::failed("legacy", "db down"));
}

struct BrokenCandidates;

#[async_trait::async_trait]
impl LegacySupplierCandidates for BrokenCandidates {
    async fn supplier_candidates(&self, _raw_input: &str) -> anyhow::Result<serde_json::Value> {
        Ok(json!({ "candidates": "not a list" }))
    }
}

#[tokio::test]
async fn test_malformed_candidates_payload() {
    let adapter = LegacyAdapter::resolve(
        LegacySurfaces::new().with_supplier_candidates(Arc::new(BrokenCandidates)),
    )
    .expect("resolve");

    let err = adapter.suggest("acme").await.expect_err("malformed");
    assert!(matches!(err, EngineError::Malformed { .. }));
}
