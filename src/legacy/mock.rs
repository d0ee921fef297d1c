//! In-memory legacy backend implementing every entry point.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::adapter::{LegacyFind, LegacySuggestions, LegacySupplierCandidates};

/// Returns fixed records (or a fixed failure) from whichever entry point is
/// called, and counts calls.
#[derive(Debug, Default)]
pub struct MockLegacyBackend {
    records: Vec<Value>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockLegacyBackend {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> anyhow::Result<Vec<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(self.records.clone()),
        }
    }
}

#[async_trait]
impl LegacySuggestions for MockLegacyBackend {
    async fn get_suggestions(&self, _raw_input: &str) -> anyhow::Result<Vec<Value>> {
        self.answer()
    }
}

#[async_trait]
impl LegacyFind for MockLegacyBackend {
    async fn find(&self, _raw_input: &str) -> anyhow::Result<Vec<Value>> {
        self.answer()
    }
}

#[async_trait]
impl LegacySupplierCandidates for MockLegacyBackend {
    async fn supplier_candidates(&self, _raw_input: &str) -> anyhow::Result<Value> {
        self.answer().map(|records| json!({ "candidates": records }))
    }
}
