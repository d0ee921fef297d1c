//! Stub engines for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{EngineError, EngineResult, SuggestionEngine};
use crate::matching::{AnchorType, SuggestionDto, SuggestionSource};

fn stub_suggestion(entity_id: u64, name: &str, score: f64) -> SuggestionDto {
    SuggestionDto {
        entity_id,
        name: name.to_string(),
        score,
        source: SuggestionSource::Fuzzy,
        reason: "stub".to_string(),
        matched_anchor: String::new(),
        anchor_type: AnchorType::Fuzzy,
    }
}

/// Always answers with the same suggestions and counts calls.
#[derive(Debug)]
pub struct StaticEngine {
    name: String,
    suggestions: Vec<SuggestionDto>,
    calls: AtomicUsize,
}

impl StaticEngine {
    pub fn new(name: &str, suggestions: Vec<SuggestionDto>) -> Self {
        Self {
            name: name.to_string(),
            suggestions,
            calls: AtomicUsize::new(0),
        }
    }

    /// Single-suggestion engine.
    pub fn single(name: &str, entity_id: u64, entity_name: &str, score: f64) -> Self {
        Self::new(name, vec![stub_suggestion(entity_id, entity_name, score)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SuggestionEngine for StaticEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn suggest(&self, _raw_input: &str) -> EngineResult<Vec<SuggestionDto>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.suggestions.clone())
    }
}

/// Always fails with the configured message.
#[derive(Debug)]
pub struct FailingEngine {
    name: String,
    message: String,
    calls: AtomicUsize,
}

impl FailingEngine {
    pub fn new(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SuggestionEngine for FailingEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn suggest(&self, _raw_input: &str) -> EngineResult<Vec<SuggestionDto>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EngineError::failed(&self.name, &self.message))
    }
}

/// Sleeps before answering; used to trip the Authority timeout.
#[derive(Debug)]
pub struct SlowEngine {
    inner: StaticEngine,
    delay: Duration,
}

impl SlowEngine {
    pub fn new(inner: StaticEngine, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl SuggestionEngine for SlowEngine {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn suggest(&self, raw_input: &str) -> EngineResult<Vec<SuggestionDto>> {
        tokio::time::sleep(self.delay).await;
        self.inner.suggest(raw_input).await
    }
}

/// Blocks its thread without yielding, the way CPU-bound matching does. Async
/// timers cannot interrupt it.
#[derive(Debug)]
pub struct BlockingEngine {
    inner: StaticEngine,
    busy: Duration,
}

impl BlockingEngine {
    pub fn new(inner: StaticEngine, busy: Duration) -> Self {
        Self { inner, busy }
    }
}

#[async_trait]
impl SuggestionEngine for BlockingEngine {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn suggest(&self, raw_input: &str) -> EngineResult<Vec<SuggestionDto>> {
        std::thread::sleep(self.busy);
        self.inner.suggest(raw_input).await
    }
}
