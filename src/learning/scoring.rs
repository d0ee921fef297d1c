//! Reinforcement scoring for learned (input, entity) pairs.
//!
//! Kept as a pure function so the weighting can be tested in isolation:
//!
//! ```text
//! total     = fuzzy_score * 70 + source_weight * 0.3 + min(usage * 5, 25)
//! effective = max(0, min(total, 100) - block * 50)
//! ```
//!
//! `fuzzy_score` is a 0.0-1.0 similarity and `source_weight` a 0-100 trust
//! level of where the pairing came from. A perfect fuzzy score from a fully
//! trusted source reaches 100 with no usage at all; usage can lift weaker
//! pairings into the auto-select band, and each block removes half the scale.

use serde::{Deserialize, Serialize};

use crate::constants::{LEVEL_A_MIN_SCORE, LEVEL_B_MIN_SCORE};

pub const SOURCE_WEIGHT_ALIAS: f64 = 100.0;
pub const SOURCE_WEIGHT_MANUAL: f64 = 90.0;
pub const SOURCE_WEIGHT_LEARNING: f64 = 80.0;
pub const SOURCE_WEIGHT_FUZZY: f64 = 60.0;

const FUZZY_POINTS: f64 = 70.0;
const SOURCE_FACTOR: f64 = 0.3;
const USAGE_BONUS_PER_USE: f64 = 5.0;
const MAX_USAGE_BONUS: f64 = 25.0;
const BLOCK_PENALTY: f64 = 50.0;
const MAX_SCORE: f64 = 100.0;

/// Output of [`score_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryScore {
    /// Positive signals only, uncapped.
    pub total_score: f64,
    /// Ranking value in `0..=100`.
    pub effective_score: f64,
    /// 3 = auto-selectable, 2 = needs confirmation, 1 = weak, 0 = suppressed.
    pub star_rating: u8,
}

/// Combines raw similarity with learned usage/block signals.
pub fn score_entry(
    fuzzy_score: f64,
    source_weight: f64,
    usage_count: u64,
    block_count: u64,
) -> EntryScore {
    let fuzzy = fuzzy_score.clamp(0.0, 1.0);
    let source = source_weight.clamp(0.0, MAX_SCORE);
    let usage_bonus = (usage_count as f64 * USAGE_BONUS_PER_USE).min(MAX_USAGE_BONUS);

    let total_score = fuzzy * FUZZY_POINTS + source * SOURCE_FACTOR + usage_bonus;
    let effective_score =
        (total_score.min(MAX_SCORE) - block_count as f64 * BLOCK_PENALTY).max(0.0);

    EntryScore {
        total_score,
        effective_score,
        star_rating: star_rating(effective_score),
    }
}

/// Maps an effective score onto the confidence bands.
pub fn star_rating(effective_score: f64) -> u8 {
    if effective_score >= LEVEL_A_MIN_SCORE {
        3
    } else if effective_score >= LEVEL_B_MIN_SCORE {
        2
    } else if effective_score > 0.0 {
        1
    } else {
        0
    }
}
