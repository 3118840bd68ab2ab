//! Outbound notification interface.
//!
//! Publishing is fire-and-forget from the services' point of view: the
//! state change is already durable when an event is emitted, so a failed
//! or slow publish is logged by [`Notifier`] and never surfaces to callers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use crate::bus::PlatformEvent;

/// Default budget for a single publish.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(1);

/// Error type for publish failures.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote endpoint returned a non-2xx status code.
    #[error("Event endpoint returned HTTP {0}")]
    HttpStatus(u16),

    /// The publisher could not be reached or constructed.
    #[error("Publisher unavailable: {0}")]
    Unavailable(String),
}

/// Publish-only port to an event bus.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn publish(&self, event: &PlatformEvent) -> Result<(), PublishError>;
}

// ---------------------------------------------------------------------------
// FanoutPublisher
// ---------------------------------------------------------------------------

/// Publishes every event to several ports concurrently.
///
/// All ports are attempted; the first error (if any) is returned.
pub struct FanoutPublisher {
    ports: Vec<Arc<dyn NotificationPort>>,
}

impl FanoutPublisher {
    pub fn new(ports: Vec<Arc<dyn NotificationPort>>) -> Self {
        Self { ports }
    }
}

#[async_trait]
impl NotificationPort for FanoutPublisher {
    async fn publish(&self, event: &PlatformEvent) -> Result<(), PublishError> {
        let results = join_all(self.ports.iter().map(|p| p.publish(event))).await;
        results.into_iter().collect::<Result<Vec<()>, _>>().map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Fire-and-forget publisher used by the template services.
#[derive(Clone)]
pub struct Notifier {
    port: Arc<dyn NotificationPort>,
    timeout: Duration,
}

impl Notifier {
    pub fn new(port: Arc<dyn NotificationPort>, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    /// Publish `event`, logging (never returning) failures and timeouts.
    pub async fn notify(&self, event: PlatformEvent) {
        let action = event.payload.action();
        match tokio::time::timeout(self.timeout, self.port.publish(&event)).await {
            Ok(Ok(())) => {
                tracing::debug!(action, "Published template event");
            }
            Ok(Err(e)) => {
                tracing::warn!(action, error = %e, "Failed to publish template event");
            }
            Err(_) => {
                tracing::warn!(
                    action,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Publishing template event timed out"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
