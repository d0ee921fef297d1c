use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{RECENT_ERRORS_CAPACITY, RESPONSE_TIMES_CAPACITY};
use crate::engine::Source;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Counters for one engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCounters {
    /// Successful calls.
    pub total_requests: u64,
    pub total_errors: u64,
    pub total_results: u64,
    /// Latest durations in milliseconds, oldest first.
    #[serde(default)]
    pub response_times: VecDeque<f64>,
    #[serde(default)]
    pub recent_errors: VecDeque<ErrorRecord>,
}

impl SourceCounters {
    pub fn record_success(&mut self, duration_ms: f64, result_count: usize) {
        self.total_requests += 1;
        self.total_results += result_count as u64;

        self.response_times.push_back(duration_ms);
        while self.response_times.len() > RESPONSE_TIMES_CAPACITY {
            self.response_times.pop_front();
        }
    }

    pub fn record_error(&mut self, message: &str) {
        self.total_errors += 1;

        self.recent_errors.push_back(ErrorRecord {
            timestamp: Utc::now(),
            message: message.to_string(),
        });
        while self.recent_errors.len() > RECENT_ERRORS_CAPACITY {
            self.recent_errors.pop_front();
        }
    }

    /// Calls that reached the engine, successful or not.
    pub fn attempts(&self) -> u64 {
        self.total_requests + self.total_errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FallbackCounters {
    pub total: u64,
    pub last_at: Option<DateTime<Utc>>,
}

/// The persisted metrics document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub authority: SourceCounters,
    pub legacy: SourceCounters,
    pub fallbacks: FallbackCounters,
}

impl MetricsSnapshot {
    pub fn source(&self, source: Source) -> &SourceCounters {
        match source {
            Source::Authority => &self.authority,
            Source::Legacy => &self.legacy,
        }
    }

    pub fn source_mut(&mut self, source: Source) -> &mut SourceCounters {
        match source {
            Source::Authority => &mut self.authority,
            Source::Legacy => &mut self.legacy,
        }
    }
}
