//! Text canonicalization for entity matching.
//!
//! Produces the normalized key used by every index:
//! - Unicode NFKD decomposition with combining marks removed (diacritics)
//! - Case folding
//! - Punctuation and symbols replaced by spaces
//! - Whitespace collapsed
//!
//! Letters and digits from every script are kept, so Arabic or Cyrillic
//! names survive normalization intact.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalizes free text into a matching key. Total and deterministic.
///
/// # Examples
///
/// ```
/// use matchgate::normalize::normalize;
///
/// assert_eq!(normalize("  Société Générale, S.A. "), "societe generale s a");
/// assert_eq!(normalize("ACME   Co."), "acme co");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a normalized key into tokens.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}
