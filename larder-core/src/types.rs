use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Measurement units recognized in ingredient text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Cup,
    Tablespoon,
    Teaspoon,
    Pound,
    Ounce,
    Piece,
    Clove,
    Slice,
    Can,
    Package,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Cup => "cup",
            Unit::Tablespoon => "tablespoon",
            Unit::Teaspoon => "teaspoon",
            Unit::Pound => "pound",
            Unit::Ounce => "ounce",
            Unit::Piece => "piece",
            Unit::Clove => "clove",
            Unit::Slice => "slice",
            Unit::Can => "can",
            Unit::Package => "package",
        }
    }

    /// Unit name agreeing in number with `quantity` ("1 cup", "2 cups").
    pub fn label(&self, quantity: f64) -> String {
        if quantity == 1.0 {
            self.as_str().to_string()
        } else {
            format!("{}s", self.as_str())
        }
    }

    /// Units counted in whole items; scaled amounts are rounded.
    pub fn is_countable(&self) -> bool {
        matches!(self, Unit::Piece | Unit::Clove | Unit::Package)
    }
}

/// One ingredient recognized in free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientToken {
    /// The comma-separated item exactly as it appeared.
    pub raw_phrase: String,
    /// Item with quantity, unit and preparation words removed and whitespace collapsed.
    /// Lookups compare it lowercased.
    pub normalized_name: String,
    /// Catalog-aligned name, when the synonym table knows the phrase.
    pub canonical_name: Option<String>,
    pub quantity: f64,
    pub unit: Unit,
}

impl IngredientToken {
    /// The name handed to product search.
    pub fn search_name(&self) -> &str {
        self.canonical_name
            .as_deref()
            .unwrap_or(&self.normalized_name)
    }
}

/// A catalog product resolved for an ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMatch {
    pub ingredient: String,
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub categories: Vec<String>,
}

impl ProductMatch {
    pub fn display_price(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

/// A user's cart. Each product id appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub user_id: String,
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            items: vec![],
        }
    }

    /// Build a snapshot, merging repeated product ids into one row.
    pub fn from_items(user_id: &str, items: Vec<CartItem>) -> Self {
        let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items {
            match merged.iter_mut().find(|m| m.product_id == item.product_id) {
                Some(existing) => existing.quantity += item.quantity,
                None => merged.push(item),
            }
        }
        Self {
            user_id: user_id.to_string(),
            items: merged,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Structured ingredient line of a suggested recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

/// A recipe suggested from cart contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSuggestion {
    /// Stable identifier derived from the title.
    pub recipe_id: String,
    pub title: String,
    pub description: String,
    pub default_servings: u32,
    pub cook_time: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<String>,
    /// Generated photo, base64 in JSON. `None` until enrichment succeeds.
    #[serde(default, with = "image_base64")]
    pub image: Option<Vec<u8>>,
    pub generated_at: DateTime<Utc>,
}

mod image_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(image: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match image {
            Some(bytes) => s.serialize_some(&STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(d)?;
        encoded
            .map(|e| STANDARD.decode(e).map_err(serde::de::Error::custom))
            .transpose()
    }
}
