//! SQLite-backed storage adapter.
//!
//! Stores each key's JSON value as text in the `kv` table. Used as the
//! durable backend behind the reactive store so the medication list and
//! auth info survive restarts.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::adapter::StorageAdapter;
use crate::db::Database;
use crate::error::StoreResult;

/// Persistent [`StorageAdapter`] over a [`Database`].
#[derive(Clone)]
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    /// Create an adapter backed by an already-migrated `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Number of writes recorded for `key`, or `None` if never written.
    #[instrument(skip(self))]
    pub async fn revision(&self, key: &str) -> StoreResult<Option<i64>> {
        let key = key.to_string();
        self.db
            .execute(move |conn| {
                let result = conn.query_row(
                    "SELECT revision FROM kv WHERE key = ?1",
                    rusqlite::params![key],
                    |row| row.get(0),
                );
                match result {
                    Ok(revision) => Ok(Some(revision)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> StoreResult<Vec<String>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
                let keys = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let key = key.to_string();
        let raw: Option<String> = self
            .db
            .execute(move |conn| {
                let result = conn.query_row(
                    "SELECT value FROM kv WHERE key = ?1",
                    rusqlite::params![key],
                    |row| row.get(0),
                );
                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await?;

        raw.map(|text| serde_json::from_str::<Value>(&text))
            .transpose()
            .map_err(Into::into)
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let key = key.to_string();
        let text = serde_json::to_string(&value)?;
        let now = chrono::Utc::now().timestamp_millis();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3) \
                     ON CONFLICT(key) DO UPDATE SET \
                         value = excluded.value, \
                         updated_at = excluded.updated_at, \
                         revision = kv.revision + 1",
                    rusqlite::params![key, text, now],
                )?;
                debug!(key = %key, "kv value stored");
                Ok(())
            })
            .await
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    async fn setup() -> SqliteStorage {
        let db = Database::open_in_memory().unwrap();
        db.run_migrations().await.unwrap();
        SqliteStorage::new(db)
    }

    #[tokio::test]
    async fn get_nonexistent_returns_none() {
        let storage = setup().await;
        assert!(storage.get("missing").await.unwrap().is_none());
        assert!(storage.revision("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_and_get_json() {
        let storage = setup().await;
        let value = json!([{"id": "1", "dosage": "5mg"}]);
        storage.set("medications", value.clone()).await.unwrap();
        assert_eq!(storage.get("medications").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn set_overwrites_and_bumps_revision() {
        let storage = setup().await;
        storage.set("info", json!({"access_token": ""})).await.unwrap();
        storage
            .set("info", json!({"access_token": "abc"}))
            .await
            .unwrap();

        assert_eq!(
            storage.get("info").await.unwrap(),
            Some(json!({"access_token": "abc"}))
        );
        assert_eq!(storage.revision("info").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn keys_are_sorted() {
        let storage = setup().await;
        storage.set("medications", json!([])).await.unwrap();
        storage.set("info", json!({})).await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["info", "medications"]);
    }
}
