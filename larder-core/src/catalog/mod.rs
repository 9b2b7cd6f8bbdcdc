//! Product catalog access.

pub mod matcher;

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

pub use matcher::{MatchOutcome, ProductMatcher};

/// Price as whole units plus nanos, the shape catalog services use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub units: i64,
    pub nanos: i32,
}

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self {
            units: cents / 100,
            nanos: ((cents % 100) * 10_000_000) as i32,
        }
    }

    pub fn cents(&self) -> i64 {
        self.units * 100 + i64::from(self.nanos.max(0) / 10_000_000)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.units, self.nanos.max(0) / 10_000_000)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Product search against a catalog service.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// Products matching `query`. An empty list means nothing matched;
    /// an error means the catalog could not be asked.
    async fn search(&self, query: &str) -> Result<Vec<CatalogProduct>, RemoteError>;
}

static DEMO_PRODUCTS: LazyLock<Vec<CatalogProduct>> = LazyLock::new(|| {
    let json = include_str!("../../data/catalog.json");
    serde_json::from_str(json).expect("Failed to parse bundled catalog.json")
});

/// Catalog held in memory.
///
/// Search prefers a case-insensitive exact name match; otherwise returns every
/// product whose name contains the query or is contained in it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<CatalogProduct>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        Self { products }
    }

    /// The bundled grocery catalog.
    pub fn demo() -> Self {
        Self::new(DEMO_PRODUCTS.clone())
    }

    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    fn lookup(&self, query: &str) -> Vec<CatalogProduct> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return vec![];
        }

        let exact: Vec<_> = self
            .products
            .iter()
            .filter(|p| p.name.to_lowercase() == query)
            .cloned()
            .collect();
        if !exact.is_empty() {
            return exact;
        }

        self.products
            .iter()
            .filter(|p| {
                let name = p.name.to_lowercase();
                name.contains(&query) || query.contains(&name)
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProductSearch for InMemoryCatalog {
    async fn search(&self, query: &str) -> Result<Vec<CatalogProduct>, RemoteError> {
        let found = self.lookup(query);
        tracing::debug!(query = %query, results = found.len(), "Catalog search");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display_and_cents() {
        let price = Money {
            units: 8,
            nanos: 990_000_000,
        };
        assert_eq!(price.to_string(), "$8.99");
        assert_eq!(price.cents(), 899);
        assert_eq!(Money::from_cents(149), Money { units: 1, nanos: 490_000_000 });
    }

    #[test]
    fn test_demo_catalog_loads() {
        let catalog = InMemoryCatalog::demo();
        assert!(catalog.products().iter().any(|p| p.id == "GARLIC001"));
    }

    #[tokio::test]
    async fn test_exact_match_wins() {
        let catalog = InMemoryCatalog::demo();
        let found = catalog.search("garlic").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "GARLIC001");
    }

    #[tokio::test]
    async fn test_containment_match() {
        let catalog = InMemoryCatalog::demo();
        let found = catalog.search("salmon").await.unwrap();
        assert_eq!(found[0].id, "SALMON001");

        let found = catalog.search("organic roma tomatoes").await.unwrap();
        assert_eq!(found[0].id, "TOMATO001");
    }

    #[tokio::test]
    async fn test_no_match_is_empty() {
        let catalog = InMemoryCatalog::demo();
        assert!(catalog.search("quinoa").await.unwrap().is_empty());
        assert!(catalog.search("  ").await.unwrap().is_empty());
    }
}
