use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::stats::{CriteriaThresholds, MetricsStats, RolloutCriteria};
use super::types::MetricsSnapshot;
use crate::engine::Source;
use crate::store::{DocumentStore, StoreResult, update};

/// Records per-request outcomes into the shared metrics document and derives
/// statistics from it.
#[derive(Clone)]
pub struct ProductionMetrics {
    store: Arc<dyn DocumentStore<MetricsSnapshot>>,
    thresholds: CriteriaThresholds,
}

impl std::fmt::Debug for ProductionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductionMetrics")
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

impl ProductionMetrics {
    /// Recorder over `store` with the default promotion thresholds.
    pub fn new(store: Arc<dyn DocumentStore<MetricsSnapshot>>) -> Self {
        Self {
            store,
            thresholds: CriteriaThresholds::default(),
        }
    }

    /// Overrides the promotion thresholds.
    pub fn with_thresholds(mut self, thresholds: CriteriaThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Thresholds the gate is evaluated against.
    pub fn thresholds(&self) -> &CriteriaThresholds {
        &self.thresholds
    }

    /// Counts one successful call and keeps its latency in the sample window.
    pub fn record_success(
        &self,
        source: Source,
        duration_ms: f64,
        result_count: usize,
    ) -> StoreResult<()> {
        update(self.store.as_ref(), MetricsSnapshot::default, |s| {
            s.source_mut(source).record_success(duration_ms, result_count)
        })?;
        debug!(%source, duration_ms, result_count, "Recorded success");
        Ok(())
    }

    /// Counts one failed call and keeps `message` in the recent error log.
    pub fn record_error(&self, source: Source, message: &str) -> StoreResult<()> {
        update(self.store.as_ref(), MetricsSnapshot::default, |s| {
            s.source_mut(source).record_error(message)
        })?;
        debug!(%source, message, "Recorded error");
        Ok(())
    }

    /// Counts one Authority failure that was answered by Legacy.
    pub fn record_fallback(&self) -> StoreResult<()> {
        update(self.store.as_ref(), MetricsSnapshot::default, |s| {
            s.fallbacks.total += 1;
            s.fallbacks.last_at = Some(Utc::now());
        })?;
        Ok(())
    }

    /// Current counters; empty when the document is missing or unreadable.
    pub fn snapshot(&self) -> MetricsSnapshot {
        match self.store.load() {
            Ok(Some(current)) => current.data,
            Ok(None) => MetricsSnapshot::default(),
            Err(e) => {
                warn!(error = %e, "Metrics snapshot unavailable, reporting empty stats");
                MetricsSnapshot::default()
            }
        }
    }

    /// Aggregates per engine plus the Authority vs Legacy comparison.
    pub fn get_stats(&self) -> MetricsStats {
        MetricsStats::from_snapshot(&self.snapshot())
    }

    /// Per-check detail of the promotion gate.
    pub fn rollout_criteria(&self) -> RolloutCriteria {
        RolloutCriteria::evaluate(&self.get_stats(), &self.thresholds)
    }

    /// Whether every promotion check passes.
    pub fn meets_rollout_criteria(&self) -> bool {
        self.rollout_criteria().overall_pass
    }

    /// Replaces the whole document with empty counters. Used when a new
    /// rollout tier starts.
    pub fn reset(&self) -> StoreResult<()> {
        update(self.store.as_ref(), MetricsSnapshot::default, |s| {
            *s = MetricsSnapshot::default()
        })?;
        info!("Metrics reset");
        Ok(())
    }
}
