//! # medtrack-store
//!
//! Persisted reactive store for medtrack.
//!
//! Holds the medication list and auth info in memory, pushes every change
//! to subscribers immediately, and mirrors it to an asynchronous key-value
//! backend without making the UI wait.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  MedicationStore (watch channel)        │
//! │    init / add_item / update_item /      │
//! │    set_auth_info  ->  PersistHandle     │
//! ├─────────────────────────────────────────┤
//! │  write path: fire-and-forget | queue    │
//! ├─────────────────────────────────────────┤
//! │  StorageAdapter                         │
//! │    CachedStorage (moka)                 │
//! │    SqliteStorage (rusqlite WAL, kv)     │
//! │    MemoryStorage (tests, previews)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use medtrack_store::{Database, MedicationStore, SqliteStorage, StoreConfig};
//!
//! let db = Database::open_and_migrate("data/medtrack.db").await?;
//! let store = MedicationStore::new(Arc::new(SqliteStorage::new(db)), StoreConfig::new());
//! store.init().await?;
//! store.add_item(MedicationRecord::new("1").with_medication("Aspirin"));
//! ```

pub mod adapter;
pub mod cache;
pub mod db;
pub mod error;
pub mod memory;
pub mod migration;
pub mod model;
pub mod sqlite;
pub mod store;

// ── re-exports ───────────────────────────────────────────────────────

pub use adapter::StorageAdapter;
pub use cache::{CacheStats, CachedStorage, CachedStorageBuilder};
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStorage;
pub use model::{AuthInfo, INFO_KEY, MEDICATIONS_KEY, MedicationRecord, ScreenSet, StoreState};
pub use sqlite::SqliteStorage;
pub use store::{MedicationStore, PersistHandle, StoreConfig, WriteMode};
