//! Leading quantity and unit prefixes of ingredient phrases.

use std::sync::LazyLock;

use crate::types::Unit;

/// Unit spellings sorted by length (longest first) so "tablespoons" wins over "tablespoon".
static UNITS_SORTED: LazyLock<Vec<(&'static str, Unit)>> = LazyLock::new(|| {
    let mut units = UNITS_RAW.to_vec();
    units.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    units
});

const UNITS_RAW: &[(&str, Unit)] = &[
    ("cups", Unit::Cup),
    ("cup", Unit::Cup),
    ("tablespoons", Unit::Tablespoon),
    ("tablespoon", Unit::Tablespoon),
    ("tbsp", Unit::Tablespoon),
    ("teaspoons", Unit::Teaspoon),
    ("teaspoon", Unit::Teaspoon),
    ("tsp", Unit::Teaspoon),
    ("pounds", Unit::Pound),
    ("pound", Unit::Pound),
    ("lbs", Unit::Pound),
    ("lb", Unit::Pound),
    ("ounces", Unit::Ounce),
    ("ounce", Unit::Ounce),
    ("oz", Unit::Ounce),
    ("pieces", Unit::Piece),
    ("piece", Unit::Piece),
    ("cloves", Unit::Clove),
    ("clove", Unit::Clove),
    ("slices", Unit::Slice),
    ("slice", Unit::Slice),
    ("cans", Unit::Can),
    ("can", Unit::Can),
    ("packages", Unit::Package),
    ("package", Unit::Package),
    ("pkg", Unit::Package),
];

/// A phrase split into its leading amount, unit and the remainder.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<'a> {
    /// Amount exactly as written ("1 1/2", "0.5", "2").
    pub amount_text: String,
    pub quantity: f64,
    pub unit: Unit,
    /// Unit exactly as written ("Tbsp", "cups").
    pub unit_text: &'a str,
    pub rest: &'a str,
}

impl Measured<'_> {
    /// True when the amount was written as a plain whole number.
    pub fn is_whole_amount(&self) -> bool {
        self.amount_text.chars().all(|c| c.is_ascii_digit())
    }
}

/// Split "<amount> <unit> <rest>". Both amount and a known unit are required.
pub fn split_measured(s: &str) -> Option<Measured<'_>> {
    let (amount, after_amount) = extract_amount(s);
    let amount = amount?;
    let (unit, unit_text, rest) = extract_unit(after_amount)?;
    Some(Measured {
        quantity: parse_amount(&amount),
        amount_text: amount,
        unit,
        unit_text,
        rest,
    })
}

/// Extract a leading amount token. Returns (amount, remaining).
///
/// Handles whole numbers, decimals, fractions and mixed numbers ("1 1/2").
/// Malformed tokens made of digits, dots and slashes ("1//2") still count as
/// an amount; `parse_amount` resolves them to 1.0.
pub fn extract_amount(s: &str) -> (Option<String>, &str) {
    let s = s.trim_start();
    let first_end = s.find(char::is_whitespace).unwrap_or(s.len());
    let first = &s[..first_end];
    if !is_amount_word(first) {
        return (None, s);
    }

    let after_first = s[first_end..].trim_start();

    // Mixed number: whole part followed by a fraction
    if first.chars().all(|c| c.is_ascii_digit()) {
        let second_end = after_first
            .find(char::is_whitespace)
            .unwrap_or(after_first.len());
        let second = &after_first[..second_end];
        if second.contains('/') && is_amount_word(second) {
            return (
                Some(format!("{} {}", first, second)),
                after_first[second_end..].trim_start(),
            );
        }
    }

    (Some(first.to_string()), after_first)
}

fn is_amount_word(word: &str) -> bool {
    !word.is_empty()
        && word.chars().any(|c| c.is_ascii_digit())
        && word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '/')
}

/// Numeric value of an amount token. Anything unreadable is 1.0.
pub fn parse_amount(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    let value = match words.as_slice() {
        [whole, fraction] => match (whole.parse::<f64>(), parse_fraction(fraction)) {
            (Ok(w), Some(f)) => Some(w + f),
            _ => None,
        },
        [single] if single.contains('/') => parse_fraction(single),
        [single] => single.parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite()).unwrap_or(1.0)
}

fn parse_fraction(s: &str) -> Option<f64> {
    let (numerator, denominator) = s.split_once('/')?;
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Extract a known unit from the beginning of a string.
/// Returns (unit, unit as written, remaining).
pub fn extract_unit(s: &str) -> Option<(Unit, &str, &str)> {
    let s = s.trim_start();

    for &(spelling, unit) in UNITS_SORTED.iter() {
        let Some(prefix) = s.get(..spelling.len()) else {
            continue;
        };
        if !prefix.eq_ignore_ascii_case(spelling) {
            continue;
        }
        // Word boundary
        let after = &s[spelling.len()..];
        if after.is_empty() || after.starts_with(|c: char| c.is_whitespace() || c == '.') {
            let remaining = after.trim_start_matches('.').trim_start();
            return Some((unit, prefix, remaining));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_amount_variants() {
        assert_eq!(extract_amount("2 cups rice"), (Some("2".to_string()), "cups rice"));
        assert_eq!(extract_amount("1/2 cup milk"), (Some("1/2".to_string()), "cup milk"));
        assert_eq!(
            extract_amount("1 1/2 lbs beef"),
            (Some("1 1/2".to_string()), "lbs beef")
        );
        assert_eq!(extract_amount("0.5 oz salt"), (Some("0.5".to_string()), "oz salt"));
        assert_eq!(extract_amount("garlic"), (None, "garlic"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("2"), 2.0);
        assert_eq!(parse_amount("1/2"), 0.5);
        assert_eq!(parse_amount("1 1/2"), 1.5);
        assert_eq!(parse_amount("0.25"), 0.25);
    }

    #[test]
    fn test_malformed_amount_degrades_to_one() {
        assert_eq!(parse_amount("1//2"), 1.0);
        assert_eq!(parse_amount("3/0"), 1.0);
        assert_eq!(parse_amount("1.2.3"), 1.0);
    }

    #[test]
    fn test_extract_unit_longest_first() {
        let (unit, text, rest) = extract_unit("tablespoons olive oil").unwrap();
        assert_eq!(unit, Unit::Tablespoon);
        assert_eq!(text, "tablespoons");
        assert_eq!(rest, "olive oil");
    }

    #[test]
    fn test_extract_unit_case_insensitive() {
        let (unit, text, rest) = extract_unit("Tbsp. soy sauce").unwrap();
        assert_eq!(unit, Unit::Tablespoon);
        assert_eq!(text, "Tbsp");
        assert_eq!(rest, "soy sauce");
    }

    #[test]
    fn test_extract_unit_requires_word_boundary() {
        // "can" must not match the start of "candied"
        assert!(extract_unit("candied ginger").is_none());
        assert!(extract_unit("cupcake").is_none());
    }

    #[test]
    fn test_split_measured() {
        let m = split_measured("1 1/2 cups Jasmine Rice").unwrap();
        assert_eq!(m.quantity, 1.5);
        assert_eq!(m.unit, Unit::Cup);
        assert_eq!(m.rest, "Jasmine Rice");
        assert!(!m.is_whole_amount());

        assert!(split_measured("2 eggs").is_none());
        assert!(split_measured("cups of rice").is_none());
    }
}
