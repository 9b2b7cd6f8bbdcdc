//! Preparation and size words that never help a product search.

use std::sync::LazyLock;

use regex::Regex;

/// Compound patterns come first so "thinly sliced" goes as a unit.
static MODIFIER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bcut\s+into\s+(?:strips|pieces|chunks)\b",
        r"(?i)\b(?:thinly|finely|coarsely|roughly)\s+(?:sliced|chopped|diced|minced)\b",
        r"(?i)\b(?:fresh|grated|chopped|diced|sliced|minced|crushed|ground|whole)\b",
        r"(?i)\b(?:mixed|large|small|medium)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("modifier pattern is valid"))
    .collect()
});

/// Remove modifier words and collapse whitespace.
pub fn strip_modifiers(phrase: &str) -> String {
    let mut cleaned = phrase.to_string();
    for pattern in MODIFIER_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, " ").into_owned();
    }
    collapse_whitespace(&cleaned)
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
