//! Turning drafts into structured suggestions aligned with the cart.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use sha2::{Digest, Sha256};

use super::drafts::{
    RecipeDraft, DEFAULT_COOK_TIME, DEFAULT_DESCRIPTION, DEFAULT_INSTRUCTIONS, DEFAULT_SERVINGS,
};
use crate::ingredients::quantity::{extract_amount, parse_amount, split_measured};
use crate::types::{RecipeIngredient, RecipeSuggestion, Unit};

/// Minimum score for a draft ingredient to take a cart item's name.
const ALIGN_THRESHOLD: f64 = 40.0;

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").expect("parenthetical pattern is valid"));

static TRAILING_PREP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i),\s*(?:diced|chopped|sliced|minced|optional)\s*$")
        .expect("trailing prep pattern is valid")
});

/// Build the suggestion for the `index`th draft.
pub fn format_recipe(
    draft: &RecipeDraft,
    index: usize,
    cart_items: &[String],
    generated_at: DateTime<Utc>,
) -> RecipeSuggestion {
    let title = non_blank(draft.name.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Suggested Recipe {}", index + 1));

    let instructions = match &draft.instructions {
        Some(steps) if !steps.is_empty() => steps.clone(),
        _ => DEFAULT_INSTRUCTIONS.iter().map(|s| s.to_string()).collect(),
    };

    RecipeSuggestion {
        recipe_id: recipe_id_for(&title),
        description: non_blank(draft.description.as_deref())
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string(),
        default_servings: draft
            .servings
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_SERVINGS),
        cook_time: non_blank(draft.prep_time.as_deref())
            .unwrap_or(DEFAULT_COOK_TIME)
            .to_string(),
        ingredients: draft
            .ingredients
            .iter()
            .map(|line| reformat_ingredient(line, cart_items))
            .filter(|i| !i.name.is_empty())
            .collect(),
        instructions,
        image: None,
        generated_at,
        title,
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// "suggested_" plus the first 8 hex digits of the title's SHA-256.
pub fn recipe_id_for(title: &str) -> String {
    let digest = hex::encode(Sha256::digest(title.as_bytes()));
    format!("suggested_{}", &digest[..8])
}

/// Parse one draft ingredient line into quantity, unit and a cart-aligned name.
pub fn reformat_ingredient(line: &str, cart_items: &[String]) -> RecipeIngredient {
    let line = line.trim();
    let (quantity, unit, rest) = match split_measured(line) {
        Some(m) => (m.quantity, m.unit, m.rest),
        None => match extract_amount(line) {
            (Some(amount), rest) => (parse_amount(&amount), Unit::Piece, rest),
            (None, _) => (1.0, Unit::Piece, line),
        },
    };

    let cleaned = clean_ingredient_name(rest);
    let name = align_to_cart(&cleaned, cart_items).unwrap_or(cleaned.as_str());

    RecipeIngredient {
        name: title_case(name),
        quantity,
        unit,
    }
}

fn clean_ingredient_name(name: &str) -> String {
    let without_notes = PARENTHETICAL.replace_all(name, "");
    TRAILING_PREP.replace(&without_notes, "").trim().to_string()
}

/// The cart item that best matches `name`, if any scores above the threshold.
fn align_to_cart<'a>(name: &str, cart_items: &'a [String]) -> Option<&'a str> {
    let name = name.to_lowercase();
    if name.is_empty() {
        return None;
    }

    let mut best: Option<(&'a str, f64)> = None;
    for item in cart_items {
        let score = match_score(&name, &item.to_lowercase());
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((item.as_str(), score));
        }
        if score >= 100.0 {
            break;
        }
    }

    best.filter(|(_, score)| *score > ALIGN_THRESHOLD)
        .map(|(item, _)| item)
}

/// Similarity of a lowercased ingredient name and cart item, 0 to 100.
fn match_score(name: &str, cart: &str) -> f64 {
    if cart.is_empty() {
        return 0.0;
    }
    if name == cart {
        return 100.0;
    }

    let name_len = name.chars().count() as f64;
    let cart_len = cart.chars().count() as f64;
    if name.contains(cart) {
        return cart_len / name_len * 80.0;
    }
    if cart.contains(name) {
        return name_len / cart_len * 70.0;
    }

    let fold = |w: &str| w.trim_end_matches('s').to_string();
    let name_words: HashSet<String> = name
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .map(fold)
        .collect();
    let cart_words: HashSet<String> = cart.split_whitespace().map(fold).collect();
    if name_words.is_disjoint(&cart_words) {
        0.0
    } else {
        50.0
    }
}

/// Capitalize the first letter of every alphabetic run.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
