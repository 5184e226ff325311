//! Small text helpers shared by the matcher components.
//!
//! Keyword predicates throughout the engine are case-insensitive substring
//! checks over a lowercased message; tokenization is whitespace splitting.
//! Both are deliberately simple — the rule tables carry the intelligence.

/// Whitespace token count.
pub fn token_count(message: &str) -> usize {
    message.split_whitespace().count()
}

/// Lowercase a message once for repeated keyword checks.
pub fn normalize(message: &str) -> String {
    message.to_lowercase()
}

/// Whether the (already lowercased) haystack contains any of the keywords.
pub fn contains_any(haystack_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack_lower.contains(k))
}
