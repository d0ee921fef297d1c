//! Derived statistics. Everything here is a pure function of a
//! [`MetricsSnapshot`].

use serde::{Deserialize, Serialize};

use super::types::{FallbackCounters, MetricsSnapshot, SourceCounters};
use crate::constants::{
    MAX_AUTHORITY_ERROR_RATE_PERCENT, MAX_FALLBACK_RATE_PERCENT, MAX_P95_LATENCY_DELTA_MS,
};

/// Nearest-rank percentile over ascending `sorted`. Zero for no samples.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub samples: usize,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl PerformanceStats {
    pub fn from_durations<'a>(durations: impl IntoIterator<Item = &'a f64>) -> Self {
        let mut sorted: Vec<f64> = durations.into_iter().copied().collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(f64::total_cmp);

        let samples = sorted.len();
        Self {
            samples,
            p50: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
            avg: sorted.iter().sum::<f64>() / samples as f64,
            min: sorted[0],
            max: sorted[samples - 1],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    pub total_requests: u64,
    pub total_errors: u64,
    pub total_results: u64,
    /// Errors over all attempts, in percent.
    pub error_rate_percent: f64,
    /// Results per successful request.
    pub avg_results: f64,
    pub performance: PerformanceStats,
}

impl From<&SourceCounters> for SourceStats {
    fn from(counters: &SourceCounters) -> Self {
        let attempts = counters.attempts();
        let error_rate_percent = if attempts == 0 {
            0.0
        } else {
            counters.total_errors as f64 / attempts as f64 * 100.0
        };
        let avg_results = if counters.total_requests == 0 {
            0.0
        } else {
            counters.total_results as f64 / counters.total_requests as f64
        };

        Self {
            total_requests: counters.total_requests,
            total_errors: counters.total_errors,
            total_results: counters.total_results,
            error_rate_percent,
            avg_results,
            performance: PerformanceStats::from_durations(&counters.response_times),
        }
    }
}

/// Authority minus Legacy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonStats {
    pub error_rate_delta: f64,
    /// Zero unless both engines have latency samples.
    pub p95_latency_delta_ms: f64,
    pub avg_results_delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsStats {
    pub authority: SourceStats,
    pub legacy: SourceStats,
    pub comparison: ComparisonStats,
    pub fallbacks: FallbackCounters,
    /// Fallbacks per Authority attempt, in percent.
    pub fallback_rate_percent: f64,
    /// Authority calls made, successful or not.
    pub authority_attempts: u64,
}

impl MetricsStats {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        let authority = SourceStats::from(&snapshot.authority);
        let legacy = SourceStats::from(&snapshot.legacy);

        let p95_latency_delta_ms =
            if authority.performance.samples > 0 && legacy.performance.samples > 0 {
                authority.performance.p95 - legacy.performance.p95
            } else {
                0.0
            };
        let comparison = ComparisonStats {
            error_rate_delta: authority.error_rate_percent - legacy.error_rate_percent,
            p95_latency_delta_ms,
            avg_results_delta: authority.avg_results - legacy.avg_results,
        };

        let authority_attempts = snapshot.authority.attempts();
        let fallback_rate_percent = if authority_attempts == 0 {
            0.0
        } else {
            snapshot.fallbacks.total as f64 / authority_attempts as f64 * 100.0
        };

        Self {
            authority,
            legacy,
            comparison,
            fallbacks: snapshot.fallbacks.clone(),
            fallback_rate_percent,
            authority_attempts,
        }
    }
}

/// Limits of the promotion gate. Every check is a strict `<`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriteriaThresholds {
    pub max_error_rate_percent: f64,
    pub max_p95_latency_delta_ms: f64,
    pub max_fallback_rate_percent: f64,
}

impl Default for CriteriaThresholds {
    fn default() -> Self {
        Self {
            max_error_rate_percent: MAX_AUTHORITY_ERROR_RATE_PERCENT,
            max_p95_latency_delta_ms: MAX_P95_LATENCY_DELTA_MS,
            max_fallback_rate_percent: MAX_FALLBACK_RATE_PERCENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionCheck {
    pub name: String,
    pub actual: f64,
    pub threshold: f64,
    pub pass: bool,
}

impl CriterionCheck {
    fn below(name: &str, actual: f64, threshold: f64) -> Self {
        Self {
            name: name.to_string(),
            actual,
            threshold,
            pass: actual < threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutCriteria {
    pub error_rate: CriterionCheck,
    pub p95_latency_delta: CriterionCheck,
    pub fallback_rate: CriterionCheck,
    /// False while the Authority has not served any traffic; there is
    /// nothing to judge yet.
    pub has_authority_traffic: bool,
    pub overall_pass: bool,
}

impl RolloutCriteria {
    pub fn evaluate(stats: &MetricsStats, thresholds: &CriteriaThresholds) -> Self {
        let error_rate = CriterionCheck::below(
            "authority_error_rate_percent",
            stats.authority.error_rate_percent,
            thresholds.max_error_rate_percent,
        );
        let p95_latency_delta = CriterionCheck::below(
            "p95_latency_delta_ms",
            stats.comparison.p95_latency_delta_ms,
            thresholds.max_p95_latency_delta_ms,
        );
        let fallback_rate = CriterionCheck::below(
            "fallback_rate_percent",
            stats.fallback_rate_percent,
            thresholds.max_fallback_rate_percent,
        );

        let has_authority_traffic = stats.authority_attempts > 0;
        let overall_pass = has_authority_traffic
            && error_rate.pass
            && p95_latency_delta.pass
            && fallback_rate.pass;

        Self {
            error_rate,
            p95_latency_delta,
            fallback_rate,
            has_authority_traffic,
            overall_pass,
        }
    }
}
