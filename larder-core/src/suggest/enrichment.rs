//! Background image enrichment of cached recipe sets.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};

use super::prompts::render_image_prompt;
use crate::cache::{image_key, SuggestionCache};
use crate::config::LarderConfig;
use crate::image::{optimize_for_web, ImageGenerator};
use crate::types::RecipeSuggestion;

/// Runs enrichment jobs on a bounded pool and writes results back to the cache.
#[derive(Debug, Clone)]
pub struct EnrichmentScheduler {
    generator: Arc<dyn ImageGenerator>,
    cache: Arc<SuggestionCache>,
    workers: Arc<Semaphore>,
    image_timeout: Duration,
    optimize_images: bool,
}

impl EnrichmentScheduler {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        cache: Arc<SuggestionCache>,
        config: &LarderConfig,
    ) -> Self {
        Self {
            generator,
            cache,
            workers: Arc::new(Semaphore::new(config.enrichment_workers)),
            image_timeout: config.image_timeout,
            optimize_images: config.optimize_images,
        }
    }

    /// Start a detached job enriching `recipes` and storing them under `cache_key`.
    ///
    /// The handle may be dropped; the job keeps running.
    pub fn schedule(&self, cache_key: String, recipes: Vec<RecipeSuggestion>) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move {
            let Ok(_permit) = scheduler.workers.clone().acquire_owned().await else {
                tracing::warn!(cache_key = %cache_key, "Enrichment pool closed, skipping");
                return;
            };
            let enriched = scheduler.enrich(recipes).await;
            let with_images = enriched.iter().filter(|r| r.image.is_some()).count();
            scheduler.cache.recipes.insert(cache_key.clone(), enriched);
            tracing::info!(cache_key = %cache_key, with_images, "Enriched recipe set stored");
        })
    }

    /// Attach an image to every recipe lacking one, all recipes in parallel.
    ///
    /// Order is preserved. A failed image leaves that recipe's image empty.
    pub async fn enrich(&self, recipes: Vec<RecipeSuggestion>) -> Vec<RecipeSuggestion> {
        let mut slots: Vec<Option<RecipeSuggestion>> = vec![None; recipes.len()];
        let mut originals = Vec::with_capacity(recipes.len());
        let mut jobs = JoinSet::new();

        for (index, recipe) in recipes.into_iter().enumerate() {
            if recipe.image.is_some() {
                slots[index] = Some(recipe.clone());
            } else {
                let scheduler = self.clone();
                let mut pending = recipe.clone();
                jobs.spawn(async move {
                    let image = scheduler.image_for(&pending).await;
                    pending.image = image;
                    (index, pending)
                });
            }
            originals.push(recipe);
        }

        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok((index, recipe)) => slots[index] = Some(recipe),
                Err(e) => tracing::warn!(error = %e, "Image task panicked"),
            }
        }

        slots
            .into_iter()
            .zip(originals)
            .map(|(slot, original)| slot.unwrap_or(original))
            .collect()
    }

    async fn image_for(&self, recipe: &RecipeSuggestion) -> Option<Vec<u8>> {
        let key = image_key(&recipe.title, &recipe.description);
        if let Some(bytes) = self.cache.images.get(&key) {
            tracing::debug!(recipe = %recipe.title, "Image cache hit");
            return Some(bytes);
        }

        let prompt = render_image_prompt(recipe);
        let bytes = match tokio::time::timeout(self.image_timeout, self.generator.generate(&prompt))
            .await
        {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                tracing::warn!(recipe = %recipe.title, error = %e, "Image generation failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(
                    recipe = %recipe.title,
                    timeout_ms = self.image_timeout.as_millis() as u64,
                    "Image generation timed out"
                );
                return None;
            }
        };

        let bytes = if self.optimize_images {
            match optimize_for_web(&bytes) {
                Ok(small) => small,
                Err(e) => {
                    tracing::warn!(recipe = %recipe.title, error = %e, "Keeping unoptimized image");
                    bytes
                }
            }
        } else {
            bytes
        };

        self.cache.images.insert(key, bytes.clone());
        Some(bytes)
    }
}
