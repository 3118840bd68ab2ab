//! Audit-trail record of a published platform event.

use serde::{Deserialize, Serialize};
use replydesk_core::types::{Timestamp, UserId};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub topic: String,
    pub action: String,
    pub actor_id: Option<UserId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
