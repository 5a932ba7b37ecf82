//! In-process storage adapter.
//!
//! [`MemoryStorage`] keeps values in a map and records every `set` it
//! receives, in the order the writes were applied. Tests use the log to
//! assert on persisted payloads, and queued delays / failures to reproduce
//! out-of-order completion and backend outages.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::adapter::StorageAdapter;
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    values: HashMap<String, Value>,
    applied: Vec<(String, Value)>,
    set_delays: VecDeque<Duration>,
    fail_sets: bool,
    get_calls: usize,
}

/// Map-backed [`StorageAdapter`].
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `key` without logging a write.
    pub fn with_value(self, key: &str, value: Value) -> Self {
        self.lock().values.insert(key.to_string(), value);
        self
    }

    /// Every applied `set`, in completion order.
    pub fn applied_writes(&self) -> Vec<(String, Value)> {
        self.lock().applied.clone()
    }

    /// The payloads of applied writes to `key`.
    pub fn writes_to(&self, key: &str) -> Vec<Value> {
        self.lock()
            .applied
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Number of `get` calls served.
    pub fn get_calls(&self) -> usize {
        self.lock().get_calls
    }

    /// Delay the next `set` to arrive by `delay` before it is applied.
    ///
    /// Delays are consumed one per `set`, in arrival order.
    pub fn push_set_delay(&self, delay: Duration) {
        self.lock().set_delays.push_back(delay);
    }

    /// Make every subsequent `set` fail (or succeed again).
    pub fn fail_sets(&self, fail: bool) {
        self.lock().fail_sets = fail;
    }

    /// Current value of `key` without counting a `get`.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.lock().values.get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let mut inner = self.lock();
        inner.get_calls += 1;
        Ok(inner.values.get(key).cloned())
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let delay = self.lock().set_delays.pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.lock();
        if inner.fail_sets {
            return Err(StoreError::Backend {
                backend: "memory",
                message: format!("write to `{key}` rejected"),
            });
        }
        inner.values.insert(key.to_string(), value.clone());
        inner.applied.push((key.to_string(), value));
        debug!(key = %key, "memory value set");
        Ok(())
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn get_nonexistent_returns_none() {
        let storage = MemoryStorage::new();
        assert!(storage.get("missing").await.unwrap().is_none());
        assert_eq!(storage.get_calls(), 1);
    }

    #[tokio::test]
    async fn set_and_get() {
        let storage = MemoryStorage::new();
        storage.set("k", json!([1, 2])).await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some(json!([1, 2])));
        assert_eq!(storage.writes_to("k"), vec![json!([1, 2])]);
    }

    #[tokio::test]
    async fn prepopulated_values_are_not_logged() {
        let storage = MemoryStorage::new().with_value("k", json!("v"));
        assert_eq!(storage.peek("k"), Some(json!("v")));
        assert!(storage.applied_writes().is_empty());
    }

    #[tokio::test]
    async fn failing_sets_leave_value_untouched() {
        let storage = MemoryStorage::new().with_value("k", json!(1));
        storage.fail_sets(true);
        let err = storage.set("k", json!(2)).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend { .. }));
        assert_eq!(storage.peek("k"), Some(json!(1)));
    }

    #[tokio::test]
    async fn delayed_set_still_applies() {
        let storage = MemoryStorage::new();
        storage.push_set_delay(Duration::from_millis(5));
        storage.set("k", json!(true)).await.unwrap();
        assert_eq!(storage.peek("k"), Some(json!(true)));
    }
}
