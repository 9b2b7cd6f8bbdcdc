//! Text-generation capability used to draft recipe suggestions.

mod fake;

pub use fake::FakeProvider;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Trait for LLM providers.
///
/// Implementations are shared across tasks and must be thread-safe.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a prompt and get the model's text response.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Provider name (e.g. "fake").
    fn provider_name(&self) -> &'static str;

    fn model_name(&self) -> &str;
}

/// Build the provider selected by `LARDER_TEXT_PROVIDER` (default "fake").
///
/// The fake provider answers every prompt with a canned recipe set.
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, LlmError> {
    let provider = std::env::var("LARDER_TEXT_PROVIDER").unwrap_or_else(|_| "fake".to_string());

    match provider.as_str() {
        "fake" => Ok(Box::new(FakeProvider::with_suggestion_responses())),
        other => Err(LlmError::NotConfigured(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}
