//! Learned feedback signal: per-(input, entity) scores reinforced by
//! confirmed selections and suppressed by rejections.

pub mod cache;
pub mod error;
pub mod scoring;


pub use cache::{LearningCache, LearningCacheEntry, LearningUpdate};
pub use error::{LearningError, LearningResult};
pub use scoring::{EntryScore, score_entry, star_rating};
