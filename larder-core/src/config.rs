//! Runtime configuration from environment variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on a single catalog or cart call.
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;

/// Default bound on recipe generation.
pub const DEFAULT_GENERATION_TIMEOUT_MS: u64 = 15_000;

/// Default bound on a single image generation.
pub const DEFAULT_IMAGE_TIMEOUT_MS: u64 = 20_000;

pub const DEFAULT_RECIPE_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_RECIPE_CACHE_CAPACITY: usize = 20;
pub const DEFAULT_IMAGE_CACHE_TTL_SECS: u64 = 600;
pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 10;

/// Default number of enrichment jobs allowed to run at once.
pub const DEFAULT_ENRICHMENT_WORKERS: usize = 4;

pub const DEFAULT_USER: &str = "default_user";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}

/// What a failed cart mutation does to already-matched products in the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartFailurePolicy {
    /// Report total failure with no product data.
    #[default]
    DiscardMatches,
    /// Report failure but keep matched and unmatched ingredient data.
    KeepMatches,
}

/// Larder configuration.
#[derive(Debug, Clone)]
pub struct LarderConfig {
    pub remote_timeout: Duration,
    pub generation_timeout: Duration,
    pub image_timeout: Duration,
    pub recipe_cache_ttl: Duration,
    pub recipe_cache_capacity: usize,
    pub image_cache_ttl: Duration,
    pub image_cache_capacity: usize,
    pub enrichment_workers: usize,
    /// Shrink and re-encode generated images before caching them.
    pub optimize_images: bool,
    pub cart_failure_policy: CartFailurePolicy,
    pub default_user: String,
}

impl Default for LarderConfig {
    fn default() -> Self {
        Self {
            remote_timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
            generation_timeout: Duration::from_millis(DEFAULT_GENERATION_TIMEOUT_MS),
            image_timeout: Duration::from_millis(DEFAULT_IMAGE_TIMEOUT_MS),
            recipe_cache_ttl: Duration::from_secs(DEFAULT_RECIPE_CACHE_TTL_SECS),
            recipe_cache_capacity: DEFAULT_RECIPE_CACHE_CAPACITY,
            image_cache_ttl: Duration::from_secs(DEFAULT_IMAGE_CACHE_TTL_SECS),
            image_cache_capacity: DEFAULT_IMAGE_CACHE_CAPACITY,
            enrichment_workers: DEFAULT_ENRICHMENT_WORKERS,
            optimize_images: true,
            cart_failure_policy: CartFailurePolicy::default(),
            default_user: DEFAULT_USER.to_string(),
        }
    }
}

impl LarderConfig {
    /// Load configuration from environment variables.
    ///
    /// All optional:
    /// - `LARDER_REMOTE_TIMEOUT_MS` (default: 10000)
    /// - `LARDER_GENERATION_TIMEOUT_MS` (default: 15000)
    /// - `LARDER_IMAGE_TIMEOUT_MS` (default: 20000)
    /// - `LARDER_RECIPE_CACHE_TTL_SECS` / `LARDER_RECIPE_CACHE_CAPACITY` (default: 300 / 20)
    /// - `LARDER_IMAGE_CACHE_TTL_SECS` / `LARDER_IMAGE_CACHE_CAPACITY` (default: 600 / 10)
    /// - `LARDER_ENRICHMENT_WORKERS` (default: 4)
    /// - `LARDER_OPTIMIZE_IMAGES`: "true"/"1" or "false"/"0" (default: true)
    /// - `LARDER_CART_FAILURE_POLICY`: "discard" or "keep" (default: discard)
    /// - `LARDER_DEFAULT_USER` (default: "default_user")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let millis = |var: &str, default: Duration| -> Result<Duration, ConfigError> {
            Ok(parse_var(&lookup, var)?
                .map(Duration::from_millis)
                .unwrap_or(default))
        };
        let secs = |var: &str, default: Duration| -> Result<Duration, ConfigError> {
            Ok(parse_var(&lookup, var)?
                .map(Duration::from_secs)
                .unwrap_or(default))
        };

        let optimize_images = match lookup("LARDER_OPTIMIZE_IMAGES") {
            None => defaults.optimize_images,
            Some(v) if v == "true" || v == "1" => true,
            Some(v) if v == "false" || v == "0" => false,
            Some(v) => return Err(invalid("LARDER_OPTIMIZE_IMAGES", v)),
        };

        let cart_failure_policy = match lookup("LARDER_CART_FAILURE_POLICY").as_deref() {
            None => defaults.cart_failure_policy,
            Some("discard") => CartFailurePolicy::DiscardMatches,
            Some("keep") => CartFailurePolicy::KeepMatches,
            Some(other) => return Err(invalid("LARDER_CART_FAILURE_POLICY", other)),
        };

        let enrichment_workers = parse_var(&lookup, "LARDER_ENRICHMENT_WORKERS")?
            .unwrap_or(defaults.enrichment_workers);
        if enrichment_workers == 0 {
            return Err(invalid("LARDER_ENRICHMENT_WORKERS", "0"));
        }

        Ok(Self {
            remote_timeout: millis("LARDER_REMOTE_TIMEOUT_MS", defaults.remote_timeout)?,
            generation_timeout: millis(
                "LARDER_GENERATION_TIMEOUT_MS",
                defaults.generation_timeout,
            )?,
            image_timeout: millis("LARDER_IMAGE_TIMEOUT_MS", defaults.image_timeout)?,
            recipe_cache_ttl: secs("LARDER_RECIPE_CACHE_TTL_SECS", defaults.recipe_cache_ttl)?,
            recipe_cache_capacity: parse_var(&lookup, "LARDER_RECIPE_CACHE_CAPACITY")?
                .unwrap_or(defaults.recipe_cache_capacity),
            image_cache_ttl: secs("LARDER_IMAGE_CACHE_TTL_SECS", defaults.image_cache_ttl)?,
            image_cache_capacity: parse_var(&lookup, "LARDER_IMAGE_CACHE_CAPACITY")?
                .unwrap_or(defaults.image_cache_capacity),
            enrichment_workers,
            optimize_images,
            cart_failure_policy,
            default_user: lookup("LARDER_DEFAULT_USER").unwrap_or(defaults.default_user),
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(var, value)),
    }
}

fn invalid(var: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = LarderConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.generation_timeout, Duration::from_secs(15));
        assert_eq!(config.recipe_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.image_cache_capacity, 10);
        assert_eq!(config.cart_failure_policy, CartFailurePolicy::DiscardMatches);
        assert_eq!(config.default_user, "default_user");
    }

    #[test]
    fn test_overrides() {
        let config = LarderConfig::from_lookup(lookup_from(&[
            ("LARDER_GENERATION_TIMEOUT_MS", "250"),
            ("LARDER_RECIPE_CACHE_CAPACITY", "5"),
            ("LARDER_CART_FAILURE_POLICY", "keep"),
            ("LARDER_OPTIMIZE_IMAGES", "0"),
        ]))
        .unwrap();
        assert_eq!(config.generation_timeout, Duration::from_millis(250));
        assert_eq!(config.recipe_cache_capacity, 5);
        assert_eq!(config.cart_failure_policy, CartFailurePolicy::KeepMatches);
        assert!(!config.optimize_images);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = LarderConfig::from_lookup(lookup_from(&[("LARDER_IMAGE_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: "LARDER_IMAGE_TIMEOUT_MS".to_string(),
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        assert!(
            LarderConfig::from_lookup(lookup_from(&[("LARDER_ENRICHMENT_WORKERS", "0")])).is_err()
        );
    }
}
