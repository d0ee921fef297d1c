//! Mapping of loosely-typed legacy records onto [`SuggestionDto`].

use serde_json::Value;
use tracing::warn;

use crate::entity::EntityId;
use crate::matching::{AnchorType, SuggestionDto, SuggestionSource};

const ID_FIELDS: &[&str] = &["id", "entity_id", "supplier_id", "bank_id"];
const NAME_FIELDS: &[&str] = &["name", "official_name", "supplier_name", "bank_name"];
const SCORE_FIELDS: &[&str] = &["score", "confidence", "similarity"];

/// Converts one legacy record. Returns `None` when the record carries no
/// usable id or name.
///
/// Scores at or below 1.0 are fractions and get rescaled to `0..=100`.
pub fn reconcile_record(record: &Value) -> Option<SuggestionDto> {
    let entity_id = first_field(record, ID_FIELDS).and_then(as_entity_id)?;
    let name = first_field(record, NAME_FIELDS)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())?
        .to_string();

    let raw_score = first_field(record, SCORE_FIELDS)
        .and_then(as_f64)
        .unwrap_or(0.0);
    let score = if raw_score <= 1.0 {
        raw_score * 100.0
    } else {
        raw_score
    }
    .clamp(0.0, 100.0);

    let source = match record.get("source").and_then(Value::as_str) {
        Some("alias") => SuggestionSource::Alias,
        Some("cache") | Some("learning") => SuggestionSource::Cache,
        _ => SuggestionSource::Fuzzy,
    };

    let reason = record
        .get("reason")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| "Legacy match".to_string());
    let matched_anchor = record
        .get("matched_anchor")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(SuggestionDto {
        entity_id,
        name,
        score,
        source,
        reason,
        matched_anchor,
        anchor_type: AnchorType::from(source),
    })
}

/// Converts every usable record, keeping the legacy order.
pub fn reconcile_records(records: &[Value]) -> Vec<SuggestionDto> {
    records
        .iter()
        .filter_map(|record| {
            let dto = reconcile_record(record);
            if dto.is_none() {
                warn!(%record, "Dropping legacy record without id or name");
            }
            dto
        })
        .collect()
}

fn first_field<'a>(record: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| record.get(*name).filter(|v| !v.is_null()))
}

fn as_entity_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}
