pub mod cache;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod image;
pub mod ingredients;
pub mod llm;
pub mod orchestrator;
pub mod suggest;
pub mod types;

pub use cache::{cart_signature, CacheStats, SuggestionCache, TtlCache};
pub use cart::{parse_cart_command, CartAddOutcome, CartMutator, CartService, InMemoryCart};
pub use catalog::{CatalogProduct, InMemoryCatalog, MatchOutcome, Money, ProductMatcher, ProductSearch};
pub use config::{CartFailurePolicy, ConfigError, LarderConfig};
pub use error::RemoteError;
pub use image::{optimize_for_web, FakeImageGenerator, ImageError, ImageGenerator};
pub use llm::{FakeProvider, LlmError, LlmProvider};
pub use orchestrator::{
    InboundRequest, OrchestrationResult, OrchestrationState, OrchestrationStatus, Orchestrator,
};
pub use suggest::{SuggestionEngine, SuggestionSource, Suggestions};
pub use types::{
    CartItem, CartSnapshot, IngredientToken, ProductMatch, RecipeIngredient, RecipeSuggestion,
    Unit,
};
