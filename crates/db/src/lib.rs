//! Persistence for response templates, sharing records, usage statistics
//! and the event audit trail.
//!
//! Repositories are zero-sized structs whose methods take a [`DbPool`]
//! as their first argument. A `DbPool` wraps any [`RecordStore`] and bounds
//! every call with a timeout so no request can hang on the backend.

pub mod models;
pub mod repositories;
pub mod store;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use store::{MemoryStore, PgStore, RecordStore, StoreError};

/// Default per-call timeout when none is configured.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Cheaply cloneable handle to the configured record store.
#[derive(Clone)]
pub struct DbPool {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
}

impl DbPool {
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// A pool over a fresh [`MemoryStore`] with the default timeout.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), DEFAULT_STORE_TIMEOUT)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch and decode one record.
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let value = self.timed("get", self.store.get(collection, key)).await?;
        value
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    /// Encode and write one record, replacing any previous value.
    pub async fn put<T: Serialize>(
        &self,
        collection: &'static str,
        key: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(record)?;
        self.timed("put", self.store.put(collection, key, value)).await
    }

    /// Fetch and decode every record in a collection, ordered by key.
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &'static str,
    ) -> Result<Vec<T>, StoreError> {
        let values = self.timed("list", self.store.list(collection)).await?;
        values
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(StoreError::from)
    }

    /// Remove one record. Returns whether it existed.
    pub async fn delete(&self, collection: &'static str, key: &str) -> Result<bool, StoreError> {
        self.timed("delete", self.store.delete(collection, key)).await
    }

    async fn timed<T>(
        &self,
        op: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                tracing::error!(op, timeout_ms, "Store call timed out");
                Err(StoreError::Timeout { op, timeout_ms })
            }
        }
    }
}

/// Verify the store is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), StoreError> {
    pool.timed("ping", pool.store.ping()).await
}
