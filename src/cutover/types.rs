use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One emergency rollback, as recorded in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackEntry {
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    /// Percentage in force right before the rollback.
    pub previous_percentage: u8,
}

/// The persisted cutover document. Missing or unreadable means
/// [`CutoverConfig::default`]: disabled at 0%.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutoverConfig {
    pub enabled: bool,
    pub rollout_percentage: u8,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rollback_history: Vec<RollbackEntry>,
}

impl CutoverConfig {
    pub fn status(&self) -> CutoverStatus {
        match (self.enabled, self.rollout_percentage) {
            (false, _) => CutoverStatus::Disabled,
            (true, 0) => CutoverStatus::Enabled0,
            (true, p) if p >= 100 => CutoverStatus::FullRollout,
            (true, p) => CutoverStatus::Gradual(p),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoverStatus {
    Disabled,
    /// Enabled, but no input routes to the Authority yet.
    Enabled0,
    FullRollout,
    Gradual(u8),
}

impl std::fmt::Display for CutoverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CutoverStatus::Disabled => write!(f, "Disabled"),
            CutoverStatus::Enabled0 => write!(f, "Enabled (0%)"),
            CutoverStatus::FullRollout => write!(f, "Full rollout (100%)"),
            CutoverStatus::Gradual(p) => write!(f, "Gradual rollout ({p}%)"),
        }
    }
}

/// Which form of the input is hashed into a routing bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickyKey {
    /// The input exactly as received.
    #[default]
    Raw,
    /// The normalized input, so spelling variants share a bucket.
    Normalized,
}

impl StickyKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StickyKey::Raw => "raw",
            StickyKey::Normalized => "normalized",
        }
    }
}

impl FromStr for StickyKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(StickyKey::Raw),
            "normalized" => Ok(StickyKey::Normalized),
            other => Err(format!("unknown sticky key '{other}'")),
        }
    }
}
