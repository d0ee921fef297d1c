//! Online Authority-vs-Legacy metrics and the rollout promotion gate.
//!
//! Counters live in one shared [`MetricsSnapshot`] document updated through
//! compare-and-swap, so concurrent requests never lose increments.

pub mod recorder;
pub mod stats;
pub mod types;


pub use recorder::ProductionMetrics;
pub use stats::{
    ComparisonStats, CriteriaThresholds, CriterionCheck, MetricsStats, PerformanceStats,
    RolloutCriteria, SourceStats, percentile,
};
pub use types::{ErrorRecord, FallbackCounters, MetricsSnapshot, SourceCounters};
