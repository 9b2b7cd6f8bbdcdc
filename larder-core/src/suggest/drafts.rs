//! Decoding of model output into recipe drafts.

use serde::Deserialize;
use thiserror::Error;

pub const MAX_SUGGESTIONS: usize = 3;
pub const DEFAULT_SERVINGS: u32 = 4;
pub const DEFAULT_COOK_TIME: &str = "20 minutes";
pub const DEFAULT_DESCRIPTION: &str = "A delicious recipe made with your cart items";
pub const DEFAULT_INSTRUCTIONS: &[&str] = &["Prepare ingredients", "Cook as desired"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Response contained no recipes")]
    NoRecipes,
}

/// One recipe as the model wrote it. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecipeDraft {
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Option<Vec<String>>,
    #[serde(default, alias = "cook_time")]
    pub prep_time: Option<String>,
    #[serde(default)]
    pub servings: Option<u32>,
}

/// Strip markdown code fences (```json or ```). Each end is stripped on its own.
pub fn strip_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").unwrap_or(rest);
    }
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Decode a JSON array of drafts, keeping at most `MAX_SUGGESTIONS`.
pub fn decode_recipe_drafts(text: &str) -> Result<Vec<RecipeDraft>, DecodeError> {
    let mut drafts: Vec<RecipeDraft> = serde_json::from_str(strip_fences(text))
        .map_err(|e| DecodeError::MalformedResponse(e.to_string()))?;
    if drafts.is_empty() {
        return Err(DecodeError::NoRecipes);
    }
    drafts.truncate(MAX_SUGGESTIONS);
    Ok(drafts)
}
