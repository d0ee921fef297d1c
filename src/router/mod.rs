//! Production entry point: routes each request to the Authority or Legacy
//! engine, falls back to Legacy when the Authority fails, and records metrics.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::{RouterError, RouterResult};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{Span, error, instrument, warn};

use crate::config::Config;
use crate::constants::DEFAULT_AUTHORITY_TIMEOUT_MS;
use crate::cutover::{CutoverConfig, CutoverManager};
use crate::engine::{EngineError, EngineResult, Source, SuggestionEngine};
use crate::legacy::{LegacyAdapter, LegacySurfaces};
use crate::matching::SuggestionDto;
use crate::metrics::{MetricsSnapshot, ProductionMetrics};
use crate::store::{JsonFileStore, StoreResult};

pub struct ProductionRouter {
    authority: Arc<dyn SuggestionEngine>,
    legacy: Arc<dyn SuggestionEngine>,
    cutover: CutoverManager,
    metrics: ProductionMetrics,
    authority_timeout: Duration,
}

impl std::fmt::Debug for ProductionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductionRouter")
            .field("authority", &self.authority.name())
            .field("legacy", &self.legacy.name())
            .field("cutover", &self.cutover)
            .field("authority_timeout", &self.authority_timeout)
            .finish()
    }
}

impl ProductionRouter {
    pub fn new(
        authority: Arc<dyn SuggestionEngine>,
        legacy: Arc<dyn SuggestionEngine>,
        cutover: CutoverManager,
        metrics: ProductionMetrics,
    ) -> Self {
        Self {
            authority,
            legacy,
            cutover,
            metrics,
            authority_timeout: Duration::from_millis(DEFAULT_AUTHORITY_TIMEOUT_MS),
        }
    }

    /// Binds the legacy backend to its entry point once, up front.
    pub fn from_surfaces(
        authority: Arc<dyn SuggestionEngine>,
        surfaces: LegacySurfaces,
        cutover: CutoverManager,
        metrics: ProductionMetrics,
    ) -> RouterResult<Self> {
        let legacy = LegacyAdapter::resolve(surfaces)?;
        Ok(Self::new(authority, Arc::new(legacy), cutover, metrics))
    }

    /// File-backed cutover and metrics documents under `config.data_dir`.
    pub fn from_config(
        config: &Config,
        authority: Arc<dyn SuggestionEngine>,
        surfaces: LegacySurfaces,
    ) -> RouterResult<Self> {
        let cutover = CutoverManager::new(Arc::new(JsonFileStore::<CutoverConfig>::new(
            config.cutover_path(),
        )))
        .with_sticky_key(config.sticky_key);
        let metrics = ProductionMetrics::new(Arc::new(JsonFileStore::<MetricsSnapshot>::new(
            config.metrics_path(),
        )));

        Ok(Self::from_surfaces(authority, surfaces, cutover, metrics)?
            .with_authority_timeout(config.authority_timeout))
    }

    pub fn with_authority_timeout(mut self, timeout: Duration) -> Self {
        self.authority_timeout = timeout;
        self
    }

    pub fn cutover(&self) -> &CutoverManager {
        &self.cutover
    }

    pub fn metrics(&self) -> &ProductionMetrics {
        &self.metrics
    }

    /// Suggestions for `raw_input` from whichever engine the cutover policy
    /// picks. Authority failures are absorbed by a Legacy retry; Legacy
    /// failures are returned.
    #[instrument(skip(self), fields(source = tracing::field::Empty))]
    pub async fn get_suggestions(&self, raw_input: &str) -> RouterResult<Vec<SuggestionDto>> {
        let source = self.cutover.route(raw_input);
        Span::current().record("source", source.as_str());

        match source {
            Source::Legacy => self.call_legacy(raw_input).await,
            Source::Authority => {
                let started = Instant::now();
                match self.call_authority(raw_input).await {
                    Ok(suggestions) => {
                        log_metrics_failure(self.metrics.record_success(
                            Source::Authority,
                            elapsed_ms(started),
                            suggestions.len(),
                        ));
                        Ok(suggestions)
                    }
                    Err(e) => {
                        warn!(error = %e, "Authority failed, falling back to legacy");
                        log_metrics_failure(
                            self.metrics.record_error(Source::Authority, &e.to_string()),
                        );
                        log_metrics_failure(self.metrics.record_fallback());
                        self.call_legacy(raw_input).await
                    }
                }
            }
        }
    }

    /// Runs the Authority under its deadline. The timer only fires at await
    /// points, so an answer that arrives after the deadline is also a timeout.
    async fn call_authority(&self, raw_input: &str) -> EngineResult<Vec<SuggestionDto>> {
        let started = Instant::now();
        let outcome =
            tokio::time::timeout(self.authority_timeout, self.authority.suggest(raw_input)).await;

        match outcome {
            Ok(Ok(_)) if started.elapsed() > self.authority_timeout => {
                warn!(
                    elapsed_ms = elapsed_ms(started),
                    "Authority answered past its deadline, discarding"
                );
                Err(self.authority_timeout_error())
            }
            Ok(result) => result,
            Err(_) => Err(self.authority_timeout_error()),
        }
    }

    fn authority_timeout_error(&self) -> EngineError {
        EngineError::Timeout {
            engine: self.authority.name().to_string(),
            timeout_ms: self.authority_timeout.as_millis() as u64,
        }
    }

    async fn call_legacy(&self, raw_input: &str) -> RouterResult<Vec<SuggestionDto>> {
        let started = Instant::now();
        match self.legacy.suggest(raw_input).await {
            Ok(suggestions) => {
                log_metrics_failure(self.metrics.record_success(
                    Source::Legacy,
                    elapsed_ms(started),
                    suggestions.len(),
                ));
                Ok(suggestions)
            }
            Err(e) => {
                error!(error = %e, "Legacy failed");
                log_metrics_failure(self.metrics.record_error(Source::Legacy, &e.to_string()));
                Err(e.into())
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Metrics are best-effort; a failed write never fails the request.
fn log_metrics_failure(result: StoreResult<()>) {
    if let Err(e) = result {
        warn!(error = %e, "Failed to record metrics");
    }
}
