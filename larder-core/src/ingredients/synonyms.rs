//! Phrase to catalog-name table.

/// Scanned in order for substring matches. A key never appears before a
/// longer key that contains it, so "chicken broth" resolves before "chicken".
pub(crate) const SYNONYMS: &[(&str, &str)] = &[
    ("chicken breast", "Chicken Breast"),
    ("chicken broth", "Chicken Broth"),
    ("ground beef", "Ground Beef"),
    ("salmon fillets", "Salmon Fillets"),
    ("bell peppers", "Bell Peppers"),
    ("bell pepper", "Bell Peppers"),
    ("yellow onion", "Yellow Onion"),
    ("roma tomatoes", "Roma Tomatoes"),
    ("mixed greens", "Mixed Greens"),
    ("cheddar cheese", "Cheddar Cheese"),
    ("whole milk", "Whole Milk"),
    ("large eggs", "Large Eggs"),
    ("flour tortillas", "Flour Tortillas"),
    ("whole wheat bread", "Whole Wheat Bread"),
    ("jasmine rice", "Jasmine Rice"),
    ("egg noodles", "Egg Noodles"),
    ("olive oil", "Olive Oil"),
    ("sesame oil", "Sesame Oil"),
    ("vegetable oil", "Vegetable Oil"),
    ("soy sauce", "Soy Sauce"),
    ("vegetable broth", "Vegetable Broth"),
    ("sea salt", "Sea Salt"),
    ("fresh thyme", "Fresh Thyme"),
    ("fresh dill", "Fresh Dill"),
    ("taco seasoning", "Taco Seasoning"),
    ("taco shells", "Taco Shells"),
    ("chicken", "Chicken Breast"),
    ("beef", "Ground Beef"),
    ("salmon", "Salmon Fillets"),
    ("garlic", "Garlic"),
    ("ginger", "Ginger"),
    ("peppers", "Bell Peppers"),
    ("onions", "Yellow Onion"),
    ("onion", "Yellow Onion"),
    ("tomatoes", "Roma Tomatoes"),
    ("tomato", "Roma Tomatoes"),
    ("lettuce", "Lettuce"),
    ("carrots", "Carrots"),
    ("carrot", "Carrots"),
    ("celery", "Celery"),
    ("cucumber", "Cucumber"),
    ("greens", "Mixed Greens"),
    ("avocado", "Avocado"),
    ("cheese", "Cheddar Cheese"),
    ("milk", "Whole Milk"),
    ("eggs", "Large Eggs"),
    ("tortillas", "Flour Tortillas"),
    ("bread", "Whole Wheat Bread"),
    ("rice", "Jasmine Rice"),
    ("noodles", "Egg Noodles"),
    ("broth", "Chicken Broth"),
    ("salt", "Sea Salt"),
    ("thyme", "Fresh Thyme"),
    ("dill", "Fresh Dill"),
    ("bananas", "Bananas"),
    ("banana", "Bananas"),
    ("lemons", "Lemon"),
    ("lemon", "Lemon"),
];

/// Canonical name for a cleaned phrase: exact key first, then the first key
/// contained in the phrase.
pub fn canonicalize(cleaned: &str) -> Option<&'static str> {
    let key = cleaned.to_lowercase();
    if key.is_empty() {
        return None;
    }
    SYNONYMS
        .iter()
        .find(|(k, _)| *k == key)
        .or_else(|| SYNONYMS.iter().find(|(k, _)| key.contains(k)))
        .map(|&(_, canonical)| canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredients::modifiers::strip_modifiers;

    #[test]
    fn test_specific_keys_precede_generic_ones() {
        for (i, (earlier, _)) in SYNONYMS.iter().enumerate() {
            for (later, _) in &SYNONYMS[i + 1..] {
                assert!(
                    !(later.contains(earlier) && later != earlier),
                    "'{}' shadows '{}'",
                    earlier,
                    later
                );
            }
        }
    }

    #[test]
    fn test_canonical_names_are_fixed_points() {
        for (_, canonical) in SYNONYMS {
            let cleaned = strip_modifiers(canonical);
            assert_eq!(
                canonicalize(&cleaned),
                Some(*canonical),
                "{} did not map to itself",
                canonical
            );
        }
    }

    #[test]
    fn test_substring_lookup() {
        assert_eq!(canonicalize("boneless chicken thighs"), Some("Chicken Breast"));
        assert_eq!(canonicalize("low sodium chicken broth"), Some("Chicken Broth"));
        assert_eq!(canonicalize("quinoa"), None);
    }
}
