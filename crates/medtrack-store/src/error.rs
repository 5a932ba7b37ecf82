//! Error types for the medtrack-store crate.
//!
//! All storage operations return [`StoreError`] via [`StoreResult`].
//! The reactive store itself never raises these to subscribers; they only
//! reach callers that choose to observe a write or an initial load.

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A schema migration failed.
    #[error("migration v{version} failed: {message}")]
    Migration { version: u32, message: String },

    /// A blocking task was cancelled or panicked.
    #[error("background task failed: {0}")]
    TaskJoin(String),

    /// The write path shut down before acknowledging a write.
    #[error("writer closed before the write was acknowledged")]
    WriterClosed,

    /// The storage backend refused or failed the operation.
    #[error("storage backend `{backend}` failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}
