//! Durable event persistence service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and appends every received [`PlatformEvent`] to the
//! `events` collection. It runs as a long-lived background task and shuts
//! down gracefully when the bus sender is dropped.

use replydesk_db::models::event::EventRecord;
use replydesk_db::repositories::EventRepo;
use replydesk_db::{DbPool, StoreError};
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

/// Background service that persists template events.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop until the channel is closed.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            action = event.payload.action(),
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the audit trail.
    async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<(), StoreError> {
        let record = EventRecord {
            id: uuid::Uuid::now_v7(),
            topic: event.topic.clone(),
            action: event.payload.action().to_string(),
            actor_id: event.actor_id.clone(),
            payload: serde_json::to_value(&event.payload)?,
            created_at: event.timestamp,
        };
        EventRepo::insert(pool, &record).await
    }
}
