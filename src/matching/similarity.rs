//! String similarity and explanation anchors over normalized keys.

use crate::normalize::tokens;

/// Similarity in `0.0..=1.0`: Jaro-Winkler on the keys as written and with
/// tokens sorted, whichever is higher (so word order does not matter).
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let direct = strsim::jaro_winkler(a, b);
    let reordered = strsim::jaro_winkler(&sorted_tokens(a), &sorted_tokens(b));
    direct.max(reordered)
}

fn sorted_tokens(key: &str) -> String {
    let mut parts: Vec<&str> = tokens(key).collect();
    parts.sort_unstable();
    parts.join(" ")
}

/// The part of `input` that explains a match against `candidate`: the longest
/// shared token, else the longest shared prefix. Empty when nothing is shared.
pub fn matched_anchor(input: &str, candidate: &str) -> String {
    let candidate_tokens: Vec<&str> = tokens(candidate).collect();

    let shared_token = tokens(input)
        .filter(|t| candidate_tokens.contains(t))
        .max_by_key(|t| t.chars().count());
    if let Some(token) = shared_token {
        return token.to_string();
    }

    input
        .chars()
        .zip(candidate.chars())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a)
        .collect::<String>()
        .trim()
        .to_string()
}
