use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::reconcile::reconcile_records;
use crate::engine::{EngineError, EngineResult, SuggestionEngine};
use crate::matching::SuggestionDto;

const ENGINE_NAME: &str = "legacy";

/// `getSuggestions(rawInput) -> record[]`
#[async_trait]
pub trait LegacySuggestions: Send + Sync {
    async fn get_suggestions(&self, raw_input: &str) -> anyhow::Result<Vec<Value>>;
}

/// `find(rawInput) -> record[]`
#[async_trait]
pub trait LegacyFind: Send + Sync {
    async fn find(&self, raw_input: &str) -> anyhow::Result<Vec<Value>>;
}

/// `supplierCandidates(rawInput) -> { candidates: record[] }`
#[async_trait]
pub trait LegacySupplierCandidates: Send + Sync {
    async fn supplier_candidates(&self, raw_input: &str) -> anyhow::Result<Value>;
}

/// The entry points a legacy backend happens to implement.
#[derive(Clone, Default)]
pub struct LegacySurfaces {
    pub suggestions: Option<Arc<dyn LegacySuggestions>>,
    pub find: Option<Arc<dyn LegacyFind>>,
    pub supplier_candidates: Option<Arc<dyn LegacySupplierCandidates>>,
}

impl LegacySurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suggestions(mut self, backend: Arc<dyn LegacySuggestions>) -> Self {
        self.suggestions = Some(backend);
        self
    }

    pub fn with_find(mut self, backend: Arc<dyn LegacyFind>) -> Self {
        self.find = Some(backend);
        self
    }

    pub fn with_supplier_candidates(mut self, backend: Arc<dyn LegacySupplierCandidates>) -> Self {
        self.supplier_candidates = Some(backend);
        self
    }
}

impl std::fmt::Debug for LegacySurfaces {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacySurfaces")
            .field("suggestions", &self.suggestions.is_some())
            .field("find", &self.find.is_some())
            .field("supplier_candidates", &self.supplier_candidates.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyEntryPoint {
    GetSuggestions,
    Find,
    SupplierCandidates,
}

impl LegacyEntryPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyEntryPoint::GetSuggestions => "getSuggestions",
            LegacyEntryPoint::Find => "find",
            LegacyEntryPoint::SupplierCandidates => "supplierCandidates",
        }
    }
}

/// A legacy backend bound to exactly one entry point.
#[derive(Clone)]
pub enum LegacyAdapter {
    Suggestions(Arc<dyn LegacySuggestions>),
    Find(Arc<dyn LegacyFind>),
    SupplierCandidates(Arc<dyn LegacySupplierCandidates>),
}

impl LegacyAdapter {
    /// Binds the first available entry point in preference order:
    /// `getSuggestions`, then `find`, then `supplierCandidates`.
    pub fn resolve(surfaces: LegacySurfaces) -> EngineResult<Self> {
        let adapter = if let Some(backend) = surfaces.suggestions {
            LegacyAdapter::Suggestions(backend)
        } else if let Some(backend) = surfaces.find {
            LegacyAdapter::Find(backend)
        } else if let Some(backend) = surfaces.supplier_candidates {
            LegacyAdapter::SupplierCandidates(backend)
        } else {
            return Err(EngineError::NoLegacyEntryPoint);
        };

        info!(entry_point = adapter.entry_point().as_str(), "Legacy adapter resolved");
        Ok(adapter)
    }

    pub fn entry_point(&self) -> LegacyEntryPoint {
        match self {
            LegacyAdapter::Suggestions(_) => LegacyEntryPoint::GetSuggestions,
            LegacyAdapter::Find(_) => LegacyEntryPoint::Find,
            LegacyAdapter::SupplierCandidates(_) => LegacyEntryPoint::SupplierCandidates,
        }
    }

    async fn fetch_records(&self, raw_input: &str) -> EngineResult<Vec<Value>> {
        let fetched = match self {
            LegacyAdapter::Suggestions(backend) => backend.get_suggestions(raw_input).await,
            LegacyAdapter::Find(backend) => backend.find(raw_input).await,
            LegacyAdapter::SupplierCandidates(backend) => {
                let payload = backend
                    .supplier_candidates(raw_input)
                    .await
                    .map_err(|e| EngineError::failed(ENGINE_NAME, e.to_string()))?;
                return unwrap_candidates(payload);
            }
        };

        fetched.map_err(|e| EngineError::failed(ENGINE_NAME, e.to_string()))
    }
}

fn unwrap_candidates(payload: Value) -> EngineResult<Vec<Value>> {
    match payload {
        Value::Object(mut map) => match map.remove("candidates") {
            Some(Value::Array(records)) => Ok(records),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(EngineError::Malformed {
                engine: ENGINE_NAME.to_string(),
                reason: format!("`candidates` is not an array: {other}"),
            }),
        },
        other => Err(EngineError::Malformed {
            engine: ENGINE_NAME.to_string(),
            reason: format!("expected an object with `candidates`, got {other}"),
        }),
    }
}

impl std::fmt::Debug for LegacyAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LegacyAdapter")
            .field(&self.entry_point())
            .finish()
    }
}

#[async_trait]
impl SuggestionEngine for LegacyAdapter {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    async fn suggest(&self, raw_input: &str) -> EngineResult<Vec<SuggestionDto>> {
        let records = self.fetch_records(raw_input).await?;
        let suggestions = reconcile_records(&records);
        debug!(
            entry_point = self.entry_point().as_str(),
            records = records.len(),
            kept = suggestions.len(),
            "Legacy records reconciled"
        );
        Ok(suggestions)
    }
}
