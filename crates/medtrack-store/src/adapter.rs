//! The storage adapter seam.
//!
//! Every persistence backend (in-process map, SQLite, cached decorator)
//! implements [`StorageAdapter`]. The contract is thin: a JSON
//! value per key, no transactions, no compare-and-swap, and no ordering
//! guarantee between concurrent `set` calls. Last writer to resolve wins.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;

/// Asynchronous key-value persistence.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Read `key`. `Ok(None)` means the key was never written.
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Write `value` under `key`, replacing anything there.
    async fn set(&self, key: &str, value: Value) -> StoreResult<()>;
}

#[async_trait]
impl<T> StorageAdapter for Arc<T>
where
    T: StorageAdapter + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        (**self).set(key, value).await
    }
}
