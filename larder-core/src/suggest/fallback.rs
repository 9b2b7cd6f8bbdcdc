//! Fixed recipes used when generation is skipped or fails.

use chrono::{DateTime, Utc};

use super::format::title_case;
use crate::types::{RecipeIngredient, RecipeSuggestion, Unit};

/// How many cart items the fallback recipes draw on.
const MAIN_ITEMS: usize = 4;

/// Three template recipes built from the first few cart items.
pub fn fallback_recipes(cart_items: &[String], generated_at: DateTime<Utc>) -> Vec<RecipeSuggestion> {
    let main = &cart_items[..cart_items.len().min(MAIN_ITEMS)];
    let first = main.first().map(String::as_str);
    let pair = (main.len() >= 2).then(|| main[..2].join(" & "));

    let skillet_title = match (&pair, first) {
        (Some(pair), _) => format!("One-Skillet {} Medley", pair),
        (None, Some(first)) => format!("One-Skillet {} Medley", first),
        (None, None) => "One-Skillet Pantry Medley".to_string(),
    };
    let skillet_second = if main.len() > 1 {
        main[1..main.len().min(3)].join(", ")
    } else {
        "the remaining ingredients".to_string()
    };

    vec![
        RecipeSuggestion {
            recipe_id: "fallback_skillet_medley".to_string(),
            title: skillet_title,
            description: "A one-pan supper that brings your cart ingredients together with simple seasoning."
                .to_string(),
            default_servings: 4,
            cook_time: "25 minutes".to_string(),
            ingredients: as_ingredients(main),
            instructions: vec![
                format!(
                    "Rinse and cut {} into bite-sized pieces",
                    first.unwrap_or("the vegetables")
                ),
                "Warm a splash of oil in a large skillet over medium-high heat".to_string(),
                format!(
                    "Cook {} for 3-4 minutes until it starts to soften",
                    first.unwrap_or("the main ingredient")
                ),
                format!("Stir in {}", skillet_second),
                "Season with salt and pepper and lower the heat to medium".to_string(),
                "Cover and cook 8-10 minutes, stirring now and then, until everything is tender"
                    .to_string(),
                "Adjust the seasoning and serve hot".to_string(),
            ],
            image: None,
            generated_at,
        },
        RecipeSuggestion {
            recipe_id: "fallback_fresh_combination".to_string(),
            title: format!("Fresh {} Combination", first.unwrap_or("Ingredient")),
            description: "A light dish with minimal cooking that lets each ingredient stay fresh."
                .to_string(),
            default_servings: 3,
            cook_time: "15 minutes".to_string(),
            ingredients: as_ingredients(&main[..main.len().min(3)]),
            instructions: vec![
                format!(
                    "Trim {} and cut it into even pieces",
                    first.unwrap_or("the ingredients")
                ),
                format!(
                    "Slice or chop {}",
                    main.get(1).map(String::as_str).unwrap_or("the second ingredient")
                ),
                "Arrange everything in a large bowl or on a platter".to_string(),
                "Season lightly with salt and pepper".to_string(),
                "Toss gently so the flavors mingle".to_string(),
                "Rest for 5 minutes, then serve".to_string(),
            ],
            image: None,
            generated_at,
        },
        RecipeSuggestion {
            recipe_id: "fallback_roasted_blend".to_string(),
            title: format!("Roasted {} Blend", pair.as_deref().unwrap_or("Garden")),
            description: "High-heat roasting that caramelizes your ingredients for deep flavor."
                .to_string(),
            default_servings: 4,
            cook_time: "30 minutes".to_string(),
            ingredients: as_ingredients(main),
            instructions: vec![
                "Heat the oven to 425°F (220°C) and line a baking sheet with parchment".to_string(),
                format!(
                    "Cut {} into pieces of similar size",
                    if main.len() >= 2 {
                        main[..2].join(", ")
                    } else {
                        "all ingredients".to_string()
                    }
                ),
                "Spread in a single layer on the sheet".to_string(),
                "Drizzle with oil, season with salt and pepper and toss to coat".to_string(),
                "Roast 20-25 minutes, stirring once halfway".to_string(),
                "Roast until golden and fork-tender".to_string(),
                "Cool for 2-3 minutes before serving".to_string(),
            ],
            image: None,
            generated_at,
        },
    ]
}

fn as_ingredients(items: &[String]) -> Vec<RecipeIngredient> {
    items
        .iter()
        .map(|item| RecipeIngredient {
            name: title_case(item),
            quantity: 1.0,
            unit: Unit::Piece,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fallback_uses_first_four_items() {
        let cart = items(&["garlic", "onion", "rice", "beef", "lemon"]);
        let recipes = fallback_recipes(&cart, Utc::now());

        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[0].title, "One-Skillet garlic & onion Medley");
        assert_eq!(recipes[0].ingredients.len(), 4);
        assert_eq!(recipes[0].ingredients[0].name, "Garlic");
        assert_eq!(recipes[1].title, "Fresh garlic Combination");
        assert_eq!(recipes[1].ingredients.len(), 3);
        assert_eq!(recipes[2].title, "Roasted garlic & onion Blend");
        assert!(recipes.iter().all(|r| r.image.is_none()));
    }

    #[test]
    fn test_fallback_with_single_item() {
        let recipes = fallback_recipes(&items(&["Garlic"]), Utc::now());
        assert_eq!(recipes[0].title, "One-Skillet Garlic Medley");
        assert_eq!(recipes[2].title, "Roasted Garden Blend");
        assert_eq!(recipes[0].ingredients.len(), 1);
    }

    #[test]
    fn test_fallback_with_empty_cart() {
        let recipes = fallback_recipes(&[], Utc::now());
        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[0].title, "One-Skillet Pantry Medley");
        assert_eq!(recipes[1].title, "Fresh Ingredient Combination");
        assert!(recipes[0].ingredients.is_empty());
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let now = Utc::now();
        let cart = items(&["Garlic", "Roma Tomatoes"]);
        assert_eq!(fallback_recipes(&cart, now), fallback_recipes(&cart, now));
    }
}
