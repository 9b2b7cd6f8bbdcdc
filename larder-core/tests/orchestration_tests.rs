//! End-to-end tests of the extract -> match -> cart orchestration.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use larder_core::{
    CartFailurePolicy, CartItem, CartService, CatalogProduct, InMemoryCart, InMemoryCatalog,
    InboundRequest, LarderConfig, Money, OrchestrationState, OrchestrationStatus, Orchestrator,
    ProductSearch, RecipeIngredient, RecipeSuggestion, RemoteError, Unit,
};

/// Cart that counts add calls and can decline or fail them.
#[derive(Default)]
struct CountingCart {
    inner: InMemoryCart,
    adds: AtomicUsize,
    decline_prefix: Option<&'static str>,
    down: bool,
}

impl CountingCart {
    fn add_calls(&self) -> usize {
        self.adds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CartService for CountingCart {
    async fn add_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<bool, RemoteError> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(RemoteError::Unavailable("cart service down".to_string()));
        }
        if self
            .decline_prefix
            .is_some_and(|prefix| product_id.starts_with(prefix))
        {
            return Ok(false);
        }
        self.inner.add_item(user_id, product_id, quantity).await
    }

    async fn get_cart(&self, user_id: &str) -> Result<Vec<CartItem>, RemoteError> {
        self.inner.get_cart(user_id).await
    }
}

/// Catalog that cannot be reached.
struct DownCatalog;

#[async_trait]
impl ProductSearch for DownCatalog {
    async fn search(&self, _query: &str) -> Result<Vec<CatalogProduct>, RemoteError> {
        Err(RemoteError::Unavailable("catalog down".to_string()))
    }
}

fn orchestrator(search: Arc<dyn ProductSearch>, cart: Arc<CountingCart>) -> Orchestrator {
    Orchestrator::new(search, cart, &LarderConfig::default())
}

fn demo() -> Arc<dyn ProductSearch> {
    Arc::new(InMemoryCatalog::demo())
}

#[tokio::test]
async fn test_serves_four_request_adds_matches() {
    let cart = Arc::new(CountingCart::default());
    let orch = orchestrator(demo(), cart.clone());

    let result = orch
        .run(
            "Add selected ingredients to cart (serves 4): 2 cups jasmine rice, 3 cloves garlic",
            "alice",
        )
        .await;

    assert_eq!(result.status, OrchestrationStatus::Success);
    assert_eq!(result.ingredients, vec!["Jasmine Rice", "Garlic"]);
    assert_eq!(result.matched_ingredients, vec!["Jasmine Rice", "Garlic"]);
    assert_eq!(result.added_product_ids, vec!["RICE001", "GARLIC001"]);
    assert!(result.cart_updated);
    assert!(result.message.contains("RICE001 (Jasmine Rice)"));
    assert_eq!(
        result.states,
        vec![
            OrchestrationState::Start,
            OrchestrationState::Extract,
            OrchestrationState::Match,
            OrchestrationState::Decision,
            OrchestrationState::CartAdd,
            OrchestrationState::Respond,
            OrchestrationState::Done,
        ]
    );

    let snapshot = orch.get_cart("alice").await;
    assert_eq!(snapshot.items.len(), 2);
}

#[tokio::test]
async fn test_ingredient_without_products_is_unmatched_and_not_added() {
    let catalog = InMemoryCatalog::new(vec![CatalogProduct {
        id: "ONION001".to_string(),
        name: "Yellow Onion".to_string(),
        description: "Fresh yellow onions".to_string(),
        price: Money::from_cents(199),
        categories: vec!["produce".to_string()],
    }]);
    let cart = Arc::new(CountingCart::default());
    let orch = orchestrator(Arc::new(catalog), cart.clone());

    let result = orch
        .run("Add selected ingredients to cart (serves 2): garlic, onion", "bob")
        .await;

    assert_eq!(result.status, OrchestrationStatus::Success);
    assert_eq!(result.unmatched_ingredients, vec!["Garlic"]);
    assert_eq!(result.added_product_ids, vec!["ONION001"]);
    assert_eq!(cart.add_calls(), 1);
}

#[tokio::test]
async fn test_availability_check_never_touches_cart() {
    let cart = Arc::new(CountingCart::default());
    let orch = orchestrator(demo(), cart.clone());

    let result = orch
        .run("Check ingredient availability: garlic, avocado", "carol")
        .await;

    assert_eq!(result.status, OrchestrationStatus::Success);
    assert_eq!(result.matched_ingredients, vec!["Garlic", "Avocado"]);
    assert!(result.states.contains(&OrchestrationState::SkipAdd));
    assert!(!result.cart_updated);
    assert_eq!(cart.add_calls(), 0);
}

#[tokio::test]
async fn test_check_ingredients_envelope_never_touches_cart() {
    let cart = Arc::new(CountingCart::default());
    let orch = orchestrator(demo(), cart.clone());

    let request = InboundRequest::parse(r#"{"ingredients": ["salmon", "mixed greens"]}"#);
    let result = orch.handle(request, None).await;

    assert_eq!(result.matched_ingredients, vec!["Salmon Fillets", "Mixed Greens"]);
    assert_eq!(result.user_id, "default_user");
    assert_eq!(cart.add_calls(), 0);
}

#[tokio::test]
async fn test_catalog_outage_degrades_to_ingredient_list() {
    let cart = Arc::new(CountingCart::default());
    let orch = orchestrator(Arc::new(DownCatalog), cart.clone());

    let result = orch.run("garlic, tomatoes", "dave").await;

    assert_eq!(result.status, OrchestrationStatus::Degraded);
    assert_eq!(result.ingredients, vec!["Garlic", "Roma Tomatoes"]);
    assert!(result.products.is_empty());
    assert_eq!(result.states.last(), Some(&OrchestrationState::Fallback));
    assert_eq!(cart.add_calls(), 0);
}

#[tokio::test]
async fn test_empty_request_is_flagged() {
    let cart = Arc::new(CountingCart::default());
    let orch = orchestrator(demo(), cart.clone());

    let result = orch
        .run("Add selected ingredients to cart (serves 4): ", "erin")
        .await;

    assert!(result.no_ingredients);
    assert_eq!(result.status, OrchestrationStatus::Success);
    assert_eq!(result.message, "No ingredients found in request.");
    assert_eq!(cart.add_calls(), 0);
}

#[tokio::test]
async fn test_cart_outage_discards_matches_by_default() {
    let cart = Arc::new(CountingCart {
        down: true,
        ..Default::default()
    });
    let orch = orchestrator(demo(), cart.clone());

    let result = orch.run("garlic, avocado", "frank").await;

    assert_eq!(result.status, OrchestrationStatus::Failed);
    assert!(result.products.is_empty());
    assert!(result.matched_ingredients.is_empty());
    assert_eq!(result.failed_product_ids, vec!["GARLIC001", "AVOCADO001"]);
    assert_eq!(result.states.last(), Some(&OrchestrationState::Failed));
    assert_eq!(cart.add_calls(), 2);
}

#[tokio::test]
async fn test_cart_outage_can_keep_matches() {
    let cart = Arc::new(CountingCart {
        down: true,
        ..Default::default()
    });
    let orch = orchestrator(demo(), cart).with_cart_failure_policy(CartFailurePolicy::KeepMatches);

    let result = orch.run("garlic, avocado", "frank").await;

    assert_eq!(result.status, OrchestrationStatus::Failed);
    assert_eq!(result.matched_ingredients, vec!["Garlic", "Avocado"]);
    assert_eq!(result.products.len(), 2);
}

#[tokio::test]
async fn test_partial_cart_failure_still_succeeds() {
    let cart = Arc::new(CountingCart {
        decline_prefix: Some("AVOCADO"),
        ..Default::default()
    });
    let orch = orchestrator(demo(), cart.clone());

    let result = orch.run("garlic, avocado, onion", "gina").await;

    assert_eq!(result.status, OrchestrationStatus::Success);
    assert_eq!(result.added_product_ids, vec!["GARLIC001", "ONION001"]);
    assert_eq!(result.failed_product_ids, vec!["AVOCADO001"]);
    assert!(result.message.contains("1 could not be added"));
}

#[tokio::test]
async fn test_direct_product_add() {
    let cart = Arc::new(CountingCart::default());
    let orch = orchestrator(demo(), cart.clone());

    let request =
        InboundRequest::parse(r#"{"product_ids": ["SALMON001", "AVOCADO001"], "user_id": "hal"}"#);
    let result = orch.handle(request, None).await;

    assert_eq!(result.status, OrchestrationStatus::Success);
    assert_eq!(
        result.states,
        vec![
            OrchestrationState::Start,
            OrchestrationState::CartAdd,
            OrchestrationState::Respond,
            OrchestrationState::Done,
        ]
    );
    assert!(!result.no_ingredients);
    assert_eq!(orch.get_cart("hal").await.total_quantity(), 2);
}

#[tokio::test]
async fn test_process_recipe_scales_and_adds() {
    let cart = Arc::new(CountingCart::default());
    let orch = orchestrator(demo(), cart.clone());

    let recipe = RecipeSuggestion {
        recipe_id: "suggested_test".to_string(),
        title: "Garlic Rice".to_string(),
        description: "Rice with garlic.".to_string(),
        default_servings: 4,
        cook_time: "20 minutes".to_string(),
        ingredients: vec![
            RecipeIngredient {
                name: "Jasmine Rice".to_string(),
                quantity: 1.5,
                unit: Unit::Cup,
            },
            RecipeIngredient {
                name: "Garlic".to_string(),
                quantity: 3.0,
                unit: Unit::Clove,
            },
        ],
        instructions: vec![],
        image: None,
        generated_at: Utc::now(),
    };

    let result = orch.process_recipe(&recipe, 8, "ivy").await;

    assert_eq!(result.ingredients, vec!["Jasmine Rice", "Garlic"]);
    assert_eq!(result.added_product_ids, vec!["RICE001", "GARLIC001"]);
    assert_eq!(cart.add_calls(), 2);
}
