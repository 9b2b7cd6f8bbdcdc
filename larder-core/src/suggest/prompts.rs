//! Prompt templates for recipe drafting and recipe photos.

use crate::types::RecipeSuggestion;

/// Render the prompt asking for three recipe drafts from cart items.
pub fn render_suggestion_prompt(cart_items: &[String]) -> String {
    let cart_list = cart_items.join(", ");

    format!(
        r#"You are a recipe assistant. Suggest 3 recipes of different cuisines, meal types and cooking methods using these cart ingredients: {cart_list}

Rules:
- Only refer to ingredients from the cart, plus at most 2 extra ingredients per recipe. Never substitute one ingredient for another.
- Use 2 or more cart ingredients per recipe, spelled exactly as in the cart.
- Give every ingredient a quantity and unit, e.g. "2 cups Roma Tomatoes", "1 lb Ground Beef". No preparation words like "diced" or "optional".
- Do not list salt, pepper, sugar, cooking oil or water.
- Give 5 to 8 cooking steps with times and temperatures. Do not number them.
- prep_time must agree with the times in the steps.

Respond with JSON only, no other text:
[{{"name": "Recipe Name", "description": "One sentence about the dish.", "ingredients": ["2 cups Roma Tomatoes"], "instructions": ["..."], "prep_time": "30 minutes", "servings": 4}}]"#,
        cart_list = cart_list
    )
}

/// Render the image prompt for a recipe: title, first three ingredients, description.
pub fn render_image_prompt(recipe: &RecipeSuggestion) -> String {
    let featured: Vec<&str> = recipe
        .ingredients
        .iter()
        .take(3)
        .map(|i| i.name.as_str())
        .collect();

    format!(
        "Professional food photography: {title} featuring {featured}. {description}. \
         High quality, appetizing, well-lit, restaurant quality plating.",
        title = recipe.title,
        featured = featured.join(", "),
        description = recipe.description.trim_end_matches('.'),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RecipeIngredient, Unit};
    use chrono::Utc;

    #[test]
    fn test_render_suggestion_prompt() {
        let prompt =
            render_suggestion_prompt(&["Garlic".to_string(), "Roma Tomatoes".to_string()]);
        assert!(prompt.contains("Garlic, Roma Tomatoes"));
        assert!(prompt.contains("prep_time"));
    }

    #[test]
    fn test_render_image_prompt_uses_first_three_ingredients() {
        let ingredient = |name: &str| RecipeIngredient {
            name: name.to_string(),
            quantity: 1.0,
            unit: Unit::Piece,
        };
        let recipe = RecipeSuggestion {
            recipe_id: "r".to_string(),
            title: "Garden Stew".to_string(),
            description: "A warm stew.".to_string(),
            default_servings: 4,
            cook_time: "30 minutes".to_string(),
            ingredients: vec![
                ingredient("Carrots"),
                ingredient("Celery"),
                ingredient("Yellow Onion"),
                ingredient("Garlic"),
            ],
            instructions: vec![],
            image: None,
            generated_at: Utc::now(),
        };

        let prompt = render_image_prompt(&recipe);
        assert!(prompt.contains("Garden Stew featuring Carrots, Celery, Yellow Onion. A warm stew."));
        assert!(!prompt.contains("Garlic"));
    }
}
