//! Template lifecycle events and the outbound notification port.
//!
//! - [`PlatformEvent`] / [`TemplateEvent`] -- the typed envelope and payload
//!   published on the `TEMPLATE_UPDATE` topic.
//! - [`NotificationPort`] -- publish-only interface to the external bus.
//! - [`EventBus`] -- in-process fan-out backed by `tokio::sync::broadcast`.
//! - [`WebhookPublisher`] -- forwards events to an external HTTP endpoint.
//! - [`Notifier`] -- fire-and-forget wrapper used by the template services.
//! - [`EventPersistence`] -- background audit writer subscribed to the bus.

pub mod bus;
pub mod delivery;
pub mod persistence;
pub mod port;

pub use bus::{EventBus, PlatformEvent, RecommendationSummary, TemplateEvent, TOPIC_TEMPLATE_UPDATE};
pub use delivery::webhook::WebhookPublisher;
pub use persistence::EventPersistence;
pub use port::{FanoutPublisher, NotificationPort, Notifier, PublishError, DEFAULT_PUBLISH_TIMEOUT};
