//! Repository for the `events` collection (append-only audit trail).

use crate::models::event::EventRecord;
use crate::{DbPool, StoreError};

const COLLECTION: &str = "events";

/// Provides append and scan access to persisted events.
pub struct EventRepo;

impl EventRepo {
    pub async fn insert(pool: &DbPool, event: &EventRecord) -> Result<(), StoreError> {
        pool.put(COLLECTION, &event.id.to_string(), event).await
    }

    /// Every persisted event, oldest first.
    pub async fn list(pool: &DbPool) -> Result<Vec<EventRecord>, StoreError> {
        pool.list(COLLECTION).await
    }
}
