//! Entity-resolution matching: alias lookup, learned history and fuzzy
//! similarity combined into ranked, explained suggestions.

pub mod authority;
pub mod error;
pub mod similarity;
pub mod types;


pub use authority::MatchingAuthority;
pub use error::{MatchingError, MatchingResult};
pub use similarity::{matched_anchor, similarity};
pub use types::{AnchorType, ConfidenceLevel, SuggestionDto, SuggestionSource};
