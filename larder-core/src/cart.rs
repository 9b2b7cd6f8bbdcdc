//! Cart mutation and cart command parsing.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;

use crate::config::DEFAULT_USER;
use crate::error::{call_with_timeout, RemoteError};
use crate::types::{CartItem, CartSnapshot};

/// A cart service.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Add `quantity` of a product. `Ok(false)` means the service declined the add.
    async fn add_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<bool, RemoteError>;

    async fn get_cart(&self, user_id: &str) -> Result<Vec<CartItem>, RemoteError>;
}

/// Carts held in memory, keyed by user. Repeated adds merge quantities.
#[derive(Debug, Default)]
pub struct InMemoryCart {
    carts: Mutex<HashMap<String, Vec<CartItem>>>,
}

impl InMemoryCart {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartService for InMemoryCart {
    async fn add_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<bool, RemoteError> {
        if product_id.trim().is_empty() || quantity == 0 {
            return Ok(false);
        }

        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        let items = carts.entry(user_id.to_string()).or_default();
        match items.iter_mut().find(|i| i.product_id == product_id) {
            Some(existing) => existing.quantity += quantity,
            None => items.push(CartItem {
                product_id: product_id.to_string(),
                quantity,
            }),
        }
        Ok(true)
    }

    async fn get_cart(&self, user_id: &str) -> Result<Vec<CartItem>, RemoteError> {
        let carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(carts.get(user_id).cloned().unwrap_or_default())
    }
}

/// A product that could not be added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAdd {
    pub product_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartAddOutcome {
    pub added: Vec<String>,
    pub failed: Vec<FailedAdd>,
}

impl CartAddOutcome {
    /// True when there was something to add and nothing got in.
    pub fn all_failed(&self) -> bool {
        self.added.is_empty() && !self.failed.is_empty()
    }
}

/// Adds products to carts one call at a time.
#[derive(Clone)]
pub struct CartMutator {
    service: Arc<dyn CartService>,
    timeout: Duration,
}

impl CartMutator {
    pub fn new(service: Arc<dyn CartService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Add one of each product. Failures are recorded and skipped; nothing is rolled back.
    pub async fn add_items(&self, user_id: &str, product_ids: &[String]) -> CartAddOutcome {
        let mut outcome = CartAddOutcome::default();

        for product_id in product_ids {
            let call = self.service.add_item(user_id, product_id, 1);
            let reason = match call_with_timeout(self.timeout, call).await {
                Ok(true) => {
                    outcome.added.push(product_id.clone());
                    continue;
                }
                Ok(false) => "rejected by cart service".to_string(),
                Err(e) => e.to_string(),
            };
            tracing::warn!(user = %user_id, product = %product_id, reason = %reason, "Cart add failed");
            outcome.failed.push(FailedAdd {
                product_id: product_id.clone(),
                reason,
            });
        }

        tracing::info!(
            user = %user_id,
            added = outcome.added.len(),
            failed = outcome.failed.len(),
            "Cart update finished"
        );
        outcome
    }

    /// Current cart contents. Empty when the service cannot be reached.
    pub async fn get_cart(&self, user_id: &str) -> CartSnapshot {
        match call_with_timeout(self.timeout, self.service.get_cart(user_id)).await {
            Ok(items) => CartSnapshot::from_items(user_id, items),
            Err(e) => {
                tracing::warn!(user = %user_id, error = %e, "Failed to fetch cart");
                CartSnapshot::empty(user_id)
            }
        }
    }
}

static PRODUCT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]+\d+\b").expect("product id pattern is valid"));

static USER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\buser[:\s]+([a-zA-Z0-9\-]+)").expect("user pattern is valid")
});

/// Product ids and target user named in a free-text cart command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartCommand {
    pub product_ids: Vec<String>,
    pub user_id: String,
}

/// Parse "add CHICKEN001 and GARLIC001 for user alice" style commands.
pub fn parse_cart_command(text: &str) -> CartCommand {
    let mut product_ids: Vec<String> = Vec::new();
    for m in PRODUCT_ID.find_iter(text) {
        if !product_ids.iter().any(|id| id == m.as_str()) {
            product_ids.push(m.as_str().to_string());
        }
    }

    let user_id = USER_ID
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_USER.to_string());

    CartCommand {
        product_ids,
        user_id,
    }
}
