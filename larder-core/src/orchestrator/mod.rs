//! Orchestration of extract -> match -> (conditional) cart add.
//!
//! Each request walks a small state machine. Remote failures move it to a
//! terminal state with an explicit status instead of surfacing as errors.

mod request;

pub use request::InboundRequest;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info_span, Instrument};

use crate::cart::{CartAddOutcome, CartMutator, CartService};
use crate::catalog::{MatchOutcome, ProductMatcher, ProductSearch};
use crate::config::{CartFailurePolicy, LarderConfig};
use crate::ingredients;
use crate::suggest::scale_recipe;
use crate::types::{CartSnapshot, ProductMatch, RecipeSuggestion};

const AVAILABILITY_PREFIX: &str = "check ingredient availability";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationState {
    Start,
    Extract,
    Match,
    Decision,
    CartAdd,
    SkipAdd,
    Respond,
    Done,
    Fallback,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationStatus {
    Success,
    /// The catalog could not be reached; only extracted ingredients are reported.
    Degraded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestrationResult {
    pub status: OrchestrationStatus,
    pub user_id: String,
    pub ingredients: Vec<String>,
    pub no_ingredients: bool,
    pub matched_ingredients: Vec<String>,
    pub unmatched_ingredients: Vec<String>,
    pub failed_ingredients: Vec<String>,
    /// Distinct product ids selected for the cart.
    pub matched_product_ids: Vec<String>,
    pub products: Vec<ProductMatch>,
    pub added_product_ids: Vec<String>,
    pub failed_product_ids: Vec<String>,
    pub cart_updated: bool,
    pub message: String,
    /// States visited, in order.
    pub states: Vec<OrchestrationState>,
}

/// True unless the text is an availability check.
pub fn should_add_to_cart(text: &str) -> bool {
    !text.to_lowercase().starts_with(AVAILABILITY_PREFIX)
}

/// Working data of one run.
struct Run<'a> {
    text: &'a str,
    user_id: &'a str,
    /// Set for direct adds; extraction and matching are skipped.
    direct: bool,
    ingredients: Vec<String>,
    matches: MatchOutcome,
    product_ids: Vec<String>,
    cart: Option<CartAddOutcome>,
    message: String,
    visited: Vec<OrchestrationState>,
}

impl<'a> Run<'a> {
    fn new(text: &'a str, user_id: &'a str) -> Self {
        Self {
            text,
            user_id,
            direct: false,
            ingredients: vec![],
            matches: MatchOutcome::default(),
            product_ids: vec![],
            cart: None,
            message: String::new(),
            visited: vec![],
        }
    }
}

pub struct Orchestrator {
    matcher: ProductMatcher,
    mutator: CartMutator,
    cart_failure_policy: CartFailurePolicy,
    default_user: String,
}

impl Orchestrator {
    pub fn new(
        search: Arc<dyn ProductSearch>,
        cart: Arc<dyn CartService>,
        config: &LarderConfig,
    ) -> Self {
        Self {
            matcher: ProductMatcher::new(search, config.remote_timeout),
            mutator: CartMutator::new(cart, config.remote_timeout),
            cart_failure_policy: config.cart_failure_policy,
            default_user: config.default_user.clone(),
        }
    }

    pub fn with_cart_failure_policy(mut self, policy: CartFailurePolicy) -> Self {
        self.cart_failure_policy = policy;
        self
    }

    /// Dispatch an inbound request. `user_id` falls back to the configured default.
    pub async fn handle(&self, request: InboundRequest, user_id: Option<&str>) -> OrchestrationResult {
        match request {
            InboundRequest::Text(text) => {
                let user = user_id.unwrap_or(self.default_user.as_str());
                self.run(&text, user).await
            }
            InboundRequest::CheckIngredients { ingredients } => {
                let text = format!("Check ingredient availability: {}", ingredients.join(", "));
                let user = user_id.unwrap_or(self.default_user.as_str());
                self.run(&text, user).await
            }
            InboundRequest::AddProducts {
                product_ids,
                user_id: envelope_user,
            } => {
                let user = envelope_user
                    .as_deref()
                    .or(user_id)
                    .unwrap_or(self.default_user.as_str());
                self.add_products(user, &product_ids).await
            }
        }
    }

    /// Extract ingredients from `text`, match them and add matches to the cart
    /// unless the text is an availability check.
    pub async fn run(&self, text: &str, user_id: &str) -> OrchestrationResult {
        self.drive(Run::new(text, user_id)).await
    }

    /// Add known product ids without extraction or matching.
    pub async fn add_products(&self, user_id: &str, product_ids: &[String]) -> OrchestrationResult {
        let mut run = Run::new("", user_id);
        run.direct = true;
        run.product_ids = product_ids.to_vec();
        self.drive(run).await
    }

    /// Scale `recipe` to `servings` (non-positive means its default) and add its
    /// ingredients to the cart.
    pub async fn process_recipe(
        &self,
        recipe: &RecipeSuggestion,
        servings: i32,
        user_id: &str,
    ) -> OrchestrationResult {
        let (servings, lines) = scale_recipe(recipe, servings);
        let text = format!(
            "Add selected ingredients to cart (serves {}): {}",
            servings,
            lines.join(", ")
        );
        tracing::info!(recipe = %recipe.recipe_id, servings, "Processing recipe");
        self.run(&text, user_id).await
    }

    pub async fn get_cart(&self, user_id: &str) -> CartSnapshot {
        self.mutator.get_cart(user_id).await
    }

    async fn drive(&self, mut run: Run<'_>) -> OrchestrationResult {
        let mut state = OrchestrationState::Start;

        loop {
            run.visited.push(state);
            let span = info_span!("orchestration_state", state = ?state, user = %run.user_id);
            match self.step(state, &mut run).instrument(span).await {
                Some(next) => state = next,
                None => break,
            }
        }

        self.finish(state, run)
    }

    /// Perform `state` and pick the next one. `None` at a terminal state.
    async fn step(&self, state: OrchestrationState, run: &mut Run<'_>) -> Option<OrchestrationState> {
        use OrchestrationState::*;

        match state {
            Start if run.direct => Some(CartAdd),
            Start => Some(Extract),
            Extract => {
                run.ingredients = ingredients::extract_names(run.text);
                if run.ingredients.is_empty() {
                    tracing::warn!("No ingredients found in request");
                } else {
                    tracing::info!(count = run.ingredients.len(), "Extracted ingredients");
                }
                Some(Match)
            }
            Match => {
                run.matches = self.matcher.match_ingredients(&run.ingredients).await;
                if run.matches.catalog_unavailable() {
                    tracing::warn!("Every catalog search failed");
                    return Some(Fallback);
                }
                run.product_ids = run.matches.product_ids();
                Some(Decision)
            }
            Decision => {
                if should_add_to_cart(run.text) {
                    Some(CartAdd)
                } else {
                    Some(SkipAdd)
                }
            }
            CartAdd => {
                let outcome = self.mutator.add_items(run.user_id, &run.product_ids).await;
                let failed = outcome.all_failed();
                run.cart = Some(outcome);
                if failed {
                    Some(Failed)
                } else {
                    Some(Respond)
                }
            }
            SkipAdd => Some(Respond),
            Respond => {
                run.message = compose_message(run);
                Some(Done)
            }
            Done | Fallback | Failed => None,
        }
    }

    fn finish(&self, terminal: OrchestrationState, run: Run<'_>) -> OrchestrationResult {
        let cart = run.cart.unwrap_or_default();
        let failed_product_ids: Vec<String> =
            cart.failed.iter().map(|f| f.product_id.clone()).collect();

        let mut result = OrchestrationResult {
            status: OrchestrationStatus::Success,
            user_id: run.user_id.to_string(),
            no_ingredients: !run.direct && run.ingredients.is_empty(),
            matched_ingredients: run.matches.matched_ingredients(),
            unmatched_ingredients: run.matches.unmatched,
            failed_ingredients: run.matches.failed,
            matched_product_ids: run.product_ids,
            products: run.matches.matched,
            cart_updated: !cart.added.is_empty(),
            added_product_ids: cart.added,
            failed_product_ids,
            ingredients: run.ingredients,
            message: run.message,
            states: run.visited,
        };

        match terminal {
            OrchestrationState::Fallback => {
                result.status = OrchestrationStatus::Degraded;
                result.products.clear();
                result.matched_product_ids.clear();
                result.matched_ingredients.clear();
                result.unmatched_ingredients.clear();
                result.failed_ingredients.clear();
                result.message = format!(
                    "Catalog unavailable. Extracted {} ingredients: {}",
                    result.ingredients.len(),
                    result.ingredients.join(", ")
                );
            }
            OrchestrationState::Failed => {
                result.status = OrchestrationStatus::Failed;
                if self.cart_failure_policy == CartFailurePolicy::DiscardMatches {
                    result.products.clear();
                    result.matched_product_ids.clear();
                    result.matched_ingredients.clear();
                    result.unmatched_ingredients.clear();
                    result.failed_ingredients.clear();
                }
                result.message = format!(
                    "Could not add products to cart for user {}: {}",
                    result.user_id,
                    cart.failed
                        .iter()
                        .map(|f| format!("{} ({})", f.product_id, f.reason))
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            _ => {}
        }

        tracing::info!(
            status = ?result.status,
            matched = result.products.len(),
            added = result.added_product_ids.len(),
            "Orchestration finished"
        );
        result
    }
}

fn compose_message(run: &Run<'_>) -> String {
    let cart = run.cart.as_ref();
    let added = cart.map_or(0, |c| c.added.len());
    let failed = cart.map_or(0, |c| c.failed.len());

    let cart_note = match (cart, failed) {
        (None, _) => String::new(),
        (Some(_), 0) => format!(" Added {} products to the cart.", added),
        (Some(_), _) => format!(
            " Added {} products to the cart; {} could not be added.",
            added, failed
        ),
    };

    if run.direct {
        return format!(
            "Processed {} products for user {}.{}",
            run.product_ids.len(),
            run.user_id,
            cart_note
        );
    }
    if run.ingredients.is_empty() {
        return "No ingredients found in request.".to_string();
    }
    if run.matches.matched.is_empty() {
        return format!(
            "No products matched from ingredients: {}",
            run.ingredients.join(", ")
        );
    }

    let mut seen: Vec<&str> = Vec::new();
    let products: Vec<String> = run
        .matches
        .matched
        .iter()
        .filter(|m| {
            if seen.contains(&m.product_id.as_str()) {
                false
            } else {
                seen.push(&m.product_id);
                true
            }
        })
        .map(|m| format!("{} ({})", m.product_id, m.name))
        .collect();

    format!(
        "Matched products: {}. From ingredients: {}.{}",
        products.join(", "),
        run.matches.matched_ingredients().join(", "),
        cart_note
    )
}
