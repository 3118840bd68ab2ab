//! Keyed record storage.
//!
//! [`RecordStore`] is the whole contract the template services need from
//! persistence: per-key get/put/delete plus a full scan of a collection.
//! There are no multi-key transactions; callers serialize read-modify-write
//! cycles on a key themselves.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use replydesk_core::error::CoreError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The Postgres backend failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other backend failure.
    #[error("Store backend error: {0}")]
    Backend(String),

    /// The call did not finish within the configured timeout.
    #[error("Store call '{op}' timed out after {timeout_ms} ms")]
    Timeout { op: &'static str, timeout_ms: u64 },

    /// A record could not be encoded or decoded.
    #[error("Record encoding error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Dependency(err.to_string())
    }
}

/// Durable key-value storage grouped into named collections.
///
/// Records are opaque JSON documents. `list` returns a collection ordered
/// by key so scans are deterministic.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError>;

    async fn put(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<serde_json::Value>, StoreError>;

    /// Remove a record. Returns whether it existed.
    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError>;

    /// Cheap liveness check.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
