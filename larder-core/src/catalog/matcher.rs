use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::ProductSearch;
use crate::error::call_with_timeout;
use crate::types::ProductMatch;

/// Per-ingredient search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// Every product found, tagged with the ingredient it was found for.
    pub matched: Vec<ProductMatch>,
    /// Ingredients without products, whether the search came back empty or failed.
    pub unmatched: Vec<String>,
    /// The subset of `unmatched` whose search failed or timed out.
    pub failed: Vec<String>,
}

impl MatchOutcome {
    /// Ingredients with at least one product, in request order.
    pub fn matched_ingredients(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for m in &self.matched {
            if !names.contains(&m.ingredient) {
                names.push(m.ingredient.clone());
            }
        }
        names
    }

    /// Distinct product ids in match order.
    pub fn product_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for m in &self.matched {
            if !ids.contains(&m.product_id) {
                ids.push(m.product_id.clone());
            }
        }
        ids
    }

    /// True when there was something to search and every search failed.
    pub fn catalog_unavailable(&self) -> bool {
        self.matched.is_empty()
            && !self.failed.is_empty()
            && self.failed.len() == self.unmatched.len()
    }
}

/// Resolves ingredient names to catalog products.
#[derive(Clone)]
pub struct ProductMatcher {
    search: Arc<dyn ProductSearch>,
    timeout: Duration,
}

impl ProductMatcher {
    pub fn new(search: Arc<dyn ProductSearch>, timeout: Duration) -> Self {
        Self { search, timeout }
    }

    /// Search for each ingredient in order. One failing search does not stop the rest.
    pub async fn match_ingredients(&self, names: &[String]) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();

        for name in names {
            match call_with_timeout(self.timeout, self.search.search(name)).await {
                Ok(products) if products.is_empty() => {
                    tracing::debug!(ingredient = %name, "No catalog match");
                    outcome.unmatched.push(name.clone());
                }
                Ok(products) => {
                    tracing::debug!(ingredient = %name, count = products.len(), "Catalog match");
                    outcome
                        .matched
                        .extend(products.into_iter().map(|p| ProductMatch {
                            ingredient: name.clone(),
                            price_cents: p.price.cents(),
                            product_id: p.id,
                            name: p.name,
                            description: p.description,
                            categories: p.categories,
                        }));
                }
                Err(e) => {
                    tracing::warn!(ingredient = %name, error = %e, "Catalog search failed");
                    outcome.unmatched.push(name.clone());
                    outcome.failed.push(name.clone());
                }
            }
        }

        outcome
    }
}
