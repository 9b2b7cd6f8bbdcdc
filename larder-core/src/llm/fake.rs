//! Fake LLM provider for tests and offline runs.
//!
//! Responses are chosen by prompt substring, so tests run without network access.

use super::{LlmError, LlmProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// A fake LLM provider.
///
/// Responses are matched by checking if the prompt contains a registered substring.
/// If no match is found, returns the default response or an error.
#[derive(Debug, Default)]
pub struct FakeProvider {
    /// Map of prompt substring -> response
    responses: RwLock<HashMap<String, String>>,
    default_response: Option<String>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a FakeProvider that returns a specific response for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt_contains.to_string(), response.to_string());
    }

    /// Set the response used when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Fail every call with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `complete` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A provider answering every prompt with three recipe drafts.
    pub fn with_suggestion_responses() -> Self {
        Self::new().with_default_response(
            r#"```json
[
  {
    "name": "Garlic Tomato Skillet",
    "description": "A quick skillet supper built around ripe tomatoes and plenty of garlic.",
    "ingredients": ["4 Roma Tomatoes", "3 cloves Garlic", "2 tbsp Olive Oil", "1 cup Jasmine Rice"],
    "instructions": ["Cook the rice.", "Saute garlic in olive oil.", "Add tomatoes and simmer 10 minutes.", "Serve over rice."],
    "prep_time": "25 minutes",
    "servings": 4
  },
  {
    "name": "Chicken and Pepper Stir Fry",
    "description": "Tender chicken with crisp peppers and onion.",
    "ingredients": ["1 lb Chicken Breast (cut into strips)", "2 Bell Peppers, sliced", "1 Yellow Onion"],
    "instructions": ["Sear the chicken.", "Add peppers and onion.", "Stir fry until tender."],
    "prep_time": "20 minutes",
    "servings": 3
  },
  {
    "name": "Avocado Green Salad",
    "description": "Mixed greens with avocado and a squeeze of lemon.",
    "ingredients": ["4 cups Mixed Greens", "1 Avocado, diced"],
    "servings": 2
  }
]
```"#,
        )
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(LlmError::RequestFailed(message.clone()));
        }

        {
            let responses = self.responses.read().unwrap_or_else(PoisonError::into_inner);
            // Find first matching pattern (case-insensitive)
            let prompt_lower = prompt.to_lowercase();
            for (pattern, response) in responses.iter() {
                if prompt_lower.contains(&pattern.to_lowercase()) {
                    return Ok(response.clone());
                }
            }
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: No response configured for prompt (first 100 chars): {}",
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
