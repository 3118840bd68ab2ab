//! Template events and the in-process event bus.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`PlatformEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use async_trait::async_trait;
use chrono::Utc;
use replydesk_core::approval::ApprovalStatus;
use replydesk_core::effectiveness::UsageStats;
use replydesk_core::recommendation::TimeOfDay;
use replydesk_core::types::{TemplateId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::port::{NotificationPort, PublishError};

/// The single topic every template lifecycle event is published on.
pub const TOPIC_TEMPLATE_UPDATE: &str = "TEMPLATE_UPDATE";

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// One ranked entry of a `recommendations` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub template_id: TemplateId,
    pub score: f64,
    pub reason: String,
}

/// Action-specific payload, serialized with an `"action"` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TemplateEvent {
    Shared {
        template_id: TemplateId,
        shared_by: UserId,
        shared_with: Vec<UserId>,
        team_id: Option<String>,
    },
    ApprovalRequested {
        template_id: TemplateId,
        reviewer_id: UserId,
    },
    ReviewCompleted {
        template_id: TemplateId,
        reviewer_id: UserId,
        status: ApprovalStatus,
        comment: Option<String>,
    },
    EffectivenessUpdated {
        template_id: TemplateId,
        effectiveness: UsageStats,
    },
    Recommendations {
        ticket_id: String,
        time_of_day: TimeOfDay,
        recommendations: Vec<RecommendationSummary>,
    },
}

impl TemplateEvent {
    /// The `action` discriminator as it appears on the wire.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Shared { .. } => "shared",
            Self::ApprovalRequested { .. } => "approval_requested",
            Self::ReviewCompleted { .. } => "review_completed",
            Self::EffectivenessUpdated { .. } => "effectiveness_updated",
            Self::Recommendations { .. } => "recommendations",
        }
    }
}

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// Envelope for a published template event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    pub topic: String,
    /// User whose action produced the event, when there is one.
    pub actor_id: Option<UserId>,
    pub payload: TemplateEvent,
    pub timestamp: Timestamp,
}

impl PlatformEvent {
    /// Wrap a payload for the `TEMPLATE_UPDATE` topic, stamped now.
    pub fn new(payload: TemplateEvent) -> Self {
        Self {
            topic: TOPIC_TEMPLATE_UPDATE.to_string(),
            actor_id: None,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, actor_id: impl Into<UserId>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`PlatformEvent`].
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn send(&self, event: PlatformEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl NotificationPort for EventBus {
    async fn publish(&self, event: &PlatformEvent) -> Result<(), PublishError> {
        self.send(event.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_event() -> PlatformEvent {
        PlatformEvent::new(TemplateEvent::Shared {
            template_id: uuid::Uuid::nil(),
            shared_by: "u1".into(),
            shared_with: vec!["u2".into(), "u3".into()],
            team_id: None,
        })
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(&shared_event().with_actor("u1")).await.unwrap();

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.topic, TOPIC_TEMPLATE_UPDATE);
        assert_eq!(received.actor_id.as_deref(), Some("u1"));
        assert_eq!(received.payload.action(), "shared");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.send(shared_event());

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.payload, e2.payload);
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_succeeds() {
        let bus = EventBus::default();
        assert!(bus.publish(&shared_event()).await.is_ok());
    }

    #[test]
    fn payload_serializes_with_action_tag() {
        let json = serde_json::to_value(shared_event()).unwrap();
        assert_eq!(json["topic"], "TEMPLATE_UPDATE");
        assert_eq!(json["payload"]["action"], "shared");
        assert_eq!(json["payload"]["shared_with"][1], "u3");
    }

    #[test]
    fn review_payload_carries_lowercase_status() {
        let event = TemplateEvent::ReviewCompleted {
            template_id: uuid::Uuid::nil(),
            reviewer_id: "u4".into(),
            status: ApprovalStatus::Approved,
            comment: Some("ok".into()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "review_completed");
        assert_eq!(json["status"], "approved");
    }

    #[test]
    fn action_names_match_wire_tags() {
        let events = [
            TemplateEvent::ApprovalRequested {
                template_id: uuid::Uuid::nil(),
                reviewer_id: "r".into(),
            },
            TemplateEvent::EffectivenessUpdated {
                template_id: uuid::Uuid::nil(),
                effectiveness: UsageStats::default(),
            },
            TemplateEvent::Recommendations {
                ticket_id: "T-1".into(),
                time_of_day: TimeOfDay::Morning,
                recommendations: Vec::new(),
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["action"], event.action());
        }
    }
}
