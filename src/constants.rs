//! Cross-cutting, shared constants.
//!
//! Scores are expressed on a 0-100 scale everywhere outside the raw string
//! similarity functions, which return 0.0-1.0.

/// Number of sticky routing buckets; a rollout percentage selects a prefix of them.
pub const ROUTING_BUCKETS: u64 = 100;

pub const DEFAULT_AUTHORITY_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;
pub const DEFAULT_MAX_CANDIDATES: usize = 200;

/// Learning cache rows pulled per request before merging with fuzzy results.
pub const DEFAULT_CACHE_FETCH_LIMIT: usize = 20;

/// Level A: auto-selectable.
pub const LEVEL_A_MIN_SCORE: f64 = 90.0;
/// Level B: shown, but must be confirmed before being committed.
pub const LEVEL_B_MIN_SCORE: f64 = 70.0;

/// Fuzzy candidates whose raw similarity (0.0-1.0) falls below this are dropped.
pub const MIN_FUZZY_SIMILARITY: f64 = 0.6;

pub const RESPONSE_TIMES_CAPACITY: usize = 1000;
pub const RECENT_ERRORS_CAPACITY: usize = 100;

pub const MAX_AUTHORITY_ERROR_RATE_PERCENT: f64 = 5.0;
pub const MAX_P95_LATENCY_DELTA_MS: f64 = 100.0;
pub const MAX_FALLBACK_RATE_PERCENT: f64 = 1.0;

/// Attempts made by a read-modify-CAS update before giving up.
pub const MAX_CAS_RETRIES: usize = 64;

/// Backoff between conflicting CAS attempts, per attempt already made.
pub const CAS_BACKOFF_STEP_MICROS: u64 = 50;
/// Attempt count past which the backoff stops growing (1ms).
pub const CAS_BACKOFF_MAX_STEPS: usize = 20;
