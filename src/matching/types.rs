use serde::{Deserialize, Serialize};

use crate::constants::{LEVEL_A_MIN_SCORE, LEVEL_B_MIN_SCORE};
use crate::entity::EntityId;

/// Which signal produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Alias,
    Cache,
    Fuzzy,
}

/// What the `matched_anchor` of a suggestion refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    /// The exact alias that matched.
    Alias,
    /// Substring shared by the input and the canonical name.
    Fuzzy,
    /// The previously confirmed input.
    History,
}

impl From<SuggestionSource> for AnchorType {
    fn from(source: SuggestionSource) -> Self {
        match source {
            SuggestionSource::Alias => AnchorType::Alias,
            SuggestionSource::Cache => AnchorType::History,
            SuggestionSource::Fuzzy => AnchorType::Fuzzy,
        }
    }
}

/// Uniform suggestion shape returned by every engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionDto {
    pub entity_id: EntityId,
    pub name: String,
    /// Confidence, `0..=100`.
    pub score: f64,
    pub source: SuggestionSource,
    /// Human-readable explanation.
    pub reason: String,
    pub matched_anchor: String,
    pub anchor_type: AnchorType,
}

impl SuggestionDto {
    pub fn confidence(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.score)
    }
}

/// Confidence bands. Enforcing the confirmation step for Level B is the
/// caller's job; the engine only reports the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    /// `>= 90`: may be applied automatically.
    LevelA,
    /// `70..90`: must be confirmed before it becomes a decision.
    LevelB,
    /// `< 70`: shown, never auto-applied.
    Weak,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= LEVEL_A_MIN_SCORE {
            ConfidenceLevel::LevelA
        } else if score >= LEVEL_B_MIN_SCORE {
            ConfidenceLevel::LevelB
        } else {
            ConfidenceLevel::Weak
        }
    }

    pub fn is_auto_selectable(&self) -> bool {
        matches!(self, ConfidenceLevel::LevelA)
    }

    pub fn requires_confirmation(&self) -> bool {
        !self.is_auto_selectable()
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::LevelA => write!(f, "A"),
            ConfidenceLevel::LevelB => write!(f, "B"),
            ConfidenceLevel::Weak => write!(f, "weak"),
        }
    }
}
