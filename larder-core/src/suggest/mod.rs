//! Recipe suggestions from cart contents.
//!
//! `SuggestionEngine::generate` always returns one to three recipes. Results are
//! cached per cart and session; photos are attached later by a background job
//! that rewrites the cache entry.

pub mod drafts;
pub mod enrichment;
pub mod fallback;
pub mod format;
pub mod prompts;
pub mod scale;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::cache::{cart_signature, SuggestionCache};
use crate::config::LarderConfig;
use crate::image::ImageGenerator;
use crate::llm::LlmProvider;
use crate::types::RecipeSuggestion;

pub use drafts::{decode_recipe_drafts, DecodeError, RecipeDraft};
pub use enrichment::EnrichmentScheduler;
pub use fallback::fallback_recipes;
pub use format::format_recipe;
pub use prompts::{render_image_prompt, render_suggestion_prompt};
pub use scale::{scale_ingredient, scale_ingredient_line, scale_recipe};

/// Carts smaller than this get the fixed recipes without asking the model.
pub const MIN_ITEMS_FOR_GENERATION: usize = 2;

/// Where a suggestion set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Fewer than two cart items.
    TooFewItems,
    Cache,
    Generated,
    /// Generation failed, timed out or produced unusable output.
    Fallback,
}

/// Suggestions plus the handle of any enrichment job they started.
#[derive(Debug)]
pub struct Suggestions {
    pub recipes: Vec<RecipeSuggestion>,
    pub source: SuggestionSource,
    pub enrichment: Option<JoinHandle<()>>,
}

pub struct SuggestionEngine {
    provider: Arc<dyn LlmProvider>,
    cache: Arc<SuggestionCache>,
    scheduler: EnrichmentScheduler,
    generation_timeout: Duration,
}

impl SuggestionEngine {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        images: Arc<dyn ImageGenerator>,
        cache: Arc<SuggestionCache>,
        config: &LarderConfig,
    ) -> Self {
        Self {
            scheduler: EnrichmentScheduler::new(images, cache.clone(), config),
            provider,
            cache,
            generation_timeout: config.generation_timeout,
        }
    }

    pub fn cache(&self) -> &Arc<SuggestionCache> {
        &self.cache
    }

    /// One to three recipes for `cart_items`. Never waits on image enrichment.
    pub async fn generate(&self, cart_items: &[String], session_id: &str) -> Vec<RecipeSuggestion> {
        self.suggest(cart_items, session_id).await.recipes
    }

    /// Like `generate`, also reporting the source and the enrichment job.
    pub async fn suggest(&self, cart_items: &[String], session_id: &str) -> Suggestions {
        if cart_items.len() < MIN_ITEMS_FOR_GENERATION {
            tracing::info!(items = cart_items.len(), "Too few cart items, using fixed recipes");
            return Suggestions {
                recipes: fallback_recipes(cart_items, Utc::now()),
                source: SuggestionSource::TooFewItems,
                enrichment: None,
            };
        }

        let key = cart_signature(cart_items, session_id);

        if let Some(recipes) = self.cache.recipes.get(&key) {
            tracing::debug!(cache_key = %key, "Recipe cache hit");
            let enrichment = self.scheduler.schedule(key, recipes.clone());
            return Suggestions {
                recipes,
                source: SuggestionSource::Cache,
                enrichment: Some(enrichment),
            };
        }

        let (recipes, source) = match self.draft_recipes(cart_items).await {
            Ok(recipes) => (recipes, SuggestionSource::Generated),
            Err(reason) => {
                tracing::warn!(reason = %reason, "Recipe generation unavailable, using fixed recipes");
                (fallback_recipes(cart_items, Utc::now()), SuggestionSource::Fallback)
            }
        };

        self.cache.recipes.insert(key.clone(), recipes.clone());
        let enrichment = self.scheduler.schedule(key, recipes.clone());

        Suggestions {
            recipes,
            source,
            enrichment: Some(enrichment),
        }
    }

    async fn draft_recipes(&self, cart_items: &[String]) -> Result<Vec<RecipeSuggestion>, String> {
        let prompt = render_suggestion_prompt(cart_items);

        let response = tokio::time::timeout(self.generation_timeout, self.provider.complete(&prompt))
            .await
            .map_err(|_| format!("timed out after {:?}", self.generation_timeout))?
            .map_err(|e| e.to_string())?;

        let drafts = decode_recipe_drafts(&response).map_err(|e| e.to_string())?;
        let generated_at = Utc::now();

        tracing::info!(
            provider = self.provider.provider_name(),
            model = self.provider.model_name(),
            recipes = drafts.len(),
            "Generated recipe suggestions"
        );

        Ok(drafts
            .iter()
            .enumerate()
            .map(|(i, draft)| format_recipe(draft, i, cart_items, generated_at))
            .collect())
    }
}
