//! In-memory TTL caches for recipe sets and generated images.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lru::LruCache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

use crate::config::LarderConfig;
use crate::types::RecipeSuggestion;

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.inserted_at) >= ttl
    }
}

/// Statistics about a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// An LRU map whose entries expire `ttl` after insertion.
///
/// When full, inserting a new key evicts the least recently used entry.
/// A capacity of zero disables the cache.
#[derive(Debug)]
pub struct TtlCache<K: Hash + Eq, V> {
    name: &'static str,
    enabled: bool,
    ttl: Duration,
    entries: Mutex<LruCache<K, CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(name: &'static str, capacity: usize, ttl: Duration) -> Self {
        let size = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            enabled: capacity > 0,
            ttl,
            entries: Mutex::new(LruCache::new(size)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The unexpired value for `key`, marking it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now, self.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert or replace `key`. Replacing restarts the entry's TTL.
    pub fn insert(&self, key: K, value: V) {
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        let mut entries = self.lock();

        let expired: Vec<K> = entries
            .iter()
            .filter(|(_, e)| e.is_expired(now, self.ttl))
            .map(|(k, _)| k.clone())
            .collect();
        for k in &expired {
            entries.pop(k);
        }

        let entry = CacheEntry {
            value,
            inserted_at: now,
        };
        if let Some((evicted, _)) = entries.push(key.clone(), entry) {
            if evicted != key {
                tracing::debug!(cache = self.name, "Evicted least recently used entry");
            }
        }
    }

    /// Number of unexpired entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .iter()
            .filter(|(_, e)| !e.is_expired(now, self.ttl))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// The two stores behind recipe suggestions.
#[derive(Debug)]
pub struct SuggestionCache {
    pub recipes: TtlCache<String, Vec<RecipeSuggestion>>,
    pub images: TtlCache<String, Vec<u8>>,
}

impl SuggestionCache {
    pub fn new(config: &LarderConfig) -> Self {
        Self {
            recipes: TtlCache::new(
                "recipes",
                config.recipe_cache_capacity,
                config.recipe_cache_ttl,
            ),
            images: TtlCache::new("images", config.image_cache_capacity, config.image_cache_ttl),
        }
    }
}

/// Compute SHA256 hash of a string, returning hex encoding.
fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recipe cache key. Independent of the order of `cart_items`.
pub fn cart_signature(cart_items: &[String], session_id: &str) -> String {
    let mut sorted: Vec<&str> = cart_items.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sha256_hex(&format!("{}:{}", sorted.join(","), session_id))
}

pub fn image_key(title: &str, description: &str) -> String {
    sha256_hex(&format!("{}:{}", title, description))
}
