//! Read-through / write-through cache in front of any storage adapter.
//!
//! [`CachedStorage`] keeps recently read or written values in a
//! `moka::future::Cache` so repeated `get`s on hot keys (the medication list
//! is re-read on every screen mount) skip the backend. Writes update the
//! cache only after the backend acknowledged them, so a failed write never
//! leaves the cache ahead of the backend.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use tracing::debug;

use crate::adapter::StorageAdapter;
use crate::error::StoreResult;

// ── cache stats ──────────────────────────────────────────────────────

/// Counters tracking cache effectiveness.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Total lookups (hits + misses).
    pub fn total(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Hit rate between 0.0 and 1.0 (0.0 with no lookups).
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.hits() as f64 / total as f64
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} total={} rate={:.2}%",
            self.hits(),
            self.misses(),
            self.total(),
            self.hit_rate() * 100.0,
        )
    }
}

// ── cached storage ───────────────────────────────────────────────────

/// Caching decorator for a [`StorageAdapter`].
///
/// Absent keys are not cached, so a key written by another process shows up
/// on the next `get`.
pub struct CachedStorage<S> {
    inner: S,
    cache: Cache<String, Value>,
    stats: Arc<CacheStats>,
}

impl<S: StorageAdapter> CachedStorage<S> {
    /// Start building a cache around `inner`.
    pub fn builder(inner: S) -> CachedStorageBuilder<S> {
        CachedStorageBuilder {
            inner,
            max_capacity: 1_000,
            ttl_seconds: 300,
        }
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The wrapped adapter.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop a cached entry so the next `get` reaches the backend.
    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
        debug!(key = key, "cache invalidate");
    }
}

#[async_trait]
impl<S: StorageAdapter> StorageAdapter for CachedStorage<S> {
    fn name(&self) -> &'static str {
        "cached"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        if let Some(value) = self.cache.get(key).await {
            self.stats.record_hit();
            debug!(backend = self.inner.name(), key = key, "cache hit");
            return Ok(Some(value));
        }

        self.stats.record_miss();
        debug!(backend = self.inner.name(), key = key, "cache miss");
        let value = self.inner.get(key).await?;
        if let Some(value) = &value {
            self.cache.insert(key.to_string(), value.clone()).await;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        match self.inner.set(key, value.clone()).await {
            Ok(()) => {
                self.cache.insert(key.to_string(), value).await;
                Ok(())
            }
            Err(err) => {
                // The backend may or may not hold the new value now.
                self.cache.invalidate(key).await;
                Err(err)
            }
        }
    }
}

// ── builder ──────────────────────────────────────────────────────────

/// Builder for [`CachedStorage`].
pub struct CachedStorageBuilder<S> {
    inner: S,
    max_capacity: u64,
    ttl_seconds: u64,
}

impl<S: StorageAdapter> CachedStorageBuilder<S> {
    /// Maximum number of cached keys.
    pub fn max_capacity(mut self, cap: u64) -> Self {
        self.max_capacity = cap;
        self
    }

    /// Time-to-live in seconds for each entry.
    pub fn ttl_seconds(mut self, secs: u64) -> Self {
        self.ttl_seconds = secs;
        self
    }

    pub fn build(self) -> CachedStorage<S> {
        let cache = Cache::builder()
            .max_capacity(self.max_capacity)
            .time_to_live(Duration::from_secs(self.ttl_seconds))
            .build();

        debug!(
            backend = self.inner.name(),
            max_capacity = self.max_capacity,
            ttl_seconds = self.ttl_seconds,
            "storage cache created"
        );

        CachedStorage {
            inner: self.inner,
            cache,
            stats: Arc::new(CacheStats::default()),
        }
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryStorage;

    fn make_cache() -> CachedStorage<Arc<MemoryStorage>> {
        CachedStorage::builder(Arc::new(MemoryStorage::new()))
            .max_capacity(100)
            .ttl_seconds(60)
            .build()
    }

    #[tokio::test]
    async fn second_get_is_served_from_cache() {
        let storage = make_cache();
        storage.inner().set("k", json!(1)).await.unwrap();

        assert_eq!(storage.get("k").await.unwrap(), Some(json!(1)));
        assert_eq!(storage.get("k").await.unwrap(), Some(json!(1)));

        assert_eq!(storage.inner().get_calls(), 1);
        assert_eq!(storage.stats().hits(), 1);
        assert_eq!(storage.stats().misses(), 1);
    }

    #[tokio::test]
    async fn absent_keys_are_not_cached() {
        let storage = make_cache();
        assert!(storage.get("k").await.unwrap().is_none());
        storage.inner().set("k", json!("late")).await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some(json!("late")));
    }

    #[tokio::test]
    async fn write_through_updates_cache() {
        let storage = make_cache();
        storage.set("k", json!([1])).await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some(json!([1])));
        assert_eq!(storage.inner().get_calls(), 0);
        assert_eq!(storage.inner().writes_to("k"), vec![json!([1])]);
    }

    #[tokio::test]
    async fn failed_write_invalidates() {
        let storage = make_cache();
        storage.set("k", json!(1)).await.unwrap();
        storage.inner().fail_sets(true);

        assert!(storage.set("k", json!(2)).await.is_err());
        assert_eq!(storage.get("k").await.unwrap(), Some(json!(1)));
        assert_eq!(storage.inner().get_calls(), 1);
    }

    #[test]
    fn stats_display() {
        let stats = CacheStats::default();
        stats.hits.store(50, Ordering::Relaxed);
        stats.misses.store(50, Ordering::Relaxed);
        let display = format!("{stats}");
        assert!(display.contains("hits=50"));
        assert!(display.contains("50.00%"));
    }

    #[test]
    fn hit_rate_no_lookups() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
