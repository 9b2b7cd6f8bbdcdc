//! Serving-size scaling of recipe ingredients.

use crate::ingredients::quantity::split_measured;
use crate::types::{RecipeIngredient, RecipeSuggestion, Unit};

/// `quantity * target / default`. A zero default leaves the quantity alone.
pub fn scale_quantity(quantity: f64, default_servings: u32, target_servings: u32) -> f64 {
    if default_servings == 0 {
        return quantity;
    }
    quantity * f64::from(target_servings) / f64::from(default_servings)
}

/// Countable units round to whole numbers; integral values print without decimals.
pub fn render_quantity(quantity: f64, unit: Unit) -> String {
    if unit.is_countable() {
        format!("{}", quantity.round() as i64)
    } else if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{:.1}", quantity)
    }
}

/// "<quantity> <unit> <name>" for a scaled structured ingredient.
pub fn scale_ingredient(
    ingredient: &RecipeIngredient,
    default_servings: u32,
    target_servings: u32,
) -> String {
    let quantity = scale_quantity(ingredient.quantity, default_servings, target_servings);
    let shown = if ingredient.unit.is_countable() {
        quantity.round()
    } else {
        quantity
    };
    format!(
        "{} {} {}",
        render_quantity(quantity, ingredient.unit),
        ingredient.unit.label(shown),
        ingredient.name
    )
}

/// Scale every ingredient of `recipe`. Non-positive `servings` means the recipe's own.
///
/// Returns the servings used and one line per ingredient.
pub fn scale_recipe(recipe: &RecipeSuggestion, servings: i32) -> (u32, Vec<String>) {
    let target = u32::try_from(servings)
        .ok()
        .filter(|s| *s > 0)
        .unwrap_or(recipe.default_servings);

    let lines = recipe
        .ingredients
        .iter()
        .map(|i| scale_ingredient(i, recipe.default_servings, target))
        .collect();
    (target, lines)
}

/// Scale a free-text line such as "1 1/2 cups Jasmine Rice".
///
/// The unit is kept as written. Amounts written as fractions or decimals keep
/// one decimal place. Lines without a leading amount and unit are returned unchanged.
pub fn scale_ingredient_line(line: &str, default_servings: u32, target_servings: u32) -> String {
    let line = line.trim();
    let Some(measured) = split_measured(line) else {
        return line.to_string();
    };

    let quantity = scale_quantity(measured.quantity, default_servings, target_servings);
    let rendered = if measured.unit.is_countable() {
        format!("{}", quantity.round() as i64)
    } else if measured.is_whole_amount() && quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{:.1}", quantity)
    };

    if measured.rest.is_empty() {
        format!("{} {}", rendered, measured.unit_text)
    } else {
        format!("{} {} {}", rendered, measured.unit_text, measured.rest)
    }
}
