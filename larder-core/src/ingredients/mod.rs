//! Ingredient extraction from free-form shopping text.
//!
//! Text such as `"Add selected ingredients to cart (serves 4): 2 cups rice, 3 cloves garlic"`
//! is split into ingredient tokens. Each token has its quantity, unit and
//! preparation words stripped and is aligned to a catalog name where possible.

pub mod modifiers;
pub mod quantity;
pub mod synonyms;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{IngredientToken, Unit};
use modifiers::{collapse_whitespace, strip_modifiers};
use quantity::{extract_amount, parse_amount, split_measured};

static SERVES_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)cart\s*\(serves\s+\d+\)\s*:\s*(.+)").expect("serves pattern is valid")
});

static AVAILABILITY_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)check\s+ingredient\s+availability\s*:\s*(.+)")
        .expect("availability pattern is valid")
});

/// Parse ingredient tokens out of `text`.
///
/// Never fails: unrecognized phrases pass through with their cleaned text.
/// Tokens are deduplicated case-insensitively by search name, first occurrence wins.
pub fn parse(text: &str) -> Vec<IngredientToken> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for raw in ingredient_span(text).split([',', '\n']) {
        let Some(token) = parse_item(raw) else {
            continue;
        };
        if seen.insert(token.search_name().to_lowercase()) {
            tokens.push(token);
        }
    }

    tokens
}

/// Search names for every ingredient in `text`, in order of first appearance.
pub fn extract_names(text: &str) -> Vec<String> {
    parse(text)
        .iter()
        .map(|t| t.search_name().to_string())
        .collect()
}

/// The part of `text` holding the ingredient list.
fn ingredient_span(text: &str) -> &str {
    for pattern in [&*SERVES_LIST, &*AVAILABILITY_LIST] {
        if let Some(list) = pattern.captures(text).and_then(|c| c.get(1)) {
            return list.as_str();
        }
    }
    text
}

fn parse_item(raw: &str) -> Option<IngredientToken> {
    let item = raw.trim().trim_end_matches(['.', ';']).trim();
    if item.is_empty() {
        return None;
    }

    let (quantity, unit, name) = match split_measured(item) {
        Some(m) => (m.quantity, m.unit, m.rest),
        None => match extract_amount(item) {
            (Some(amount), rest) => (parse_amount(&amount), Unit::Piece, rest),
            (None, _) => (1.0, Unit::Piece, item),
        },
    };

    let cleaned = strip_modifiers(name);
    if cleaned.is_empty() {
        return None;
    }

    Some(IngredientToken {
        raw_phrase: raw.trim().to_string(),
        canonical_name: synonyms::canonicalize(&cleaned).map(str::to_string),
        normalized_name: collapse_whitespace(&cleaned),
        quantity,
        unit,
    })
}
