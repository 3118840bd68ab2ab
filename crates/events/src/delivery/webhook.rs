//! Webhook publisher for an external event bus.
//!
//! [`WebhookPublisher`] POSTs each JSON-encoded [`PlatformEvent`] to a fixed
//! URL. Exactly one attempt is made per event; retry policy belongs to the
//! receiving bus.

use std::time::Duration;

use async_trait::async_trait;

use crate::bus::PlatformEvent;
use crate::port::{NotificationPort, PublishError};

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers template events to an external HTTP endpoint.
pub struct WebhookPublisher {
    client: reqwest::Client,
    url: String,
}

impl WebhookPublisher {
    /// Create a publisher for `url` with a pre-configured HTTP client.
    pub fn new(url: impl Into<String>) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationPort for WebhookPublisher {
    async fn publish(&self, event: &PlatformEvent) -> Result<(), PublishError> {
        let response = self.client.post(&self.url).json(event).send().await?;
        if !response.status().is_success() {
            return Err(PublishError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::TemplateEvent;

    #[test]
    fn new_keeps_url() {
        let publisher = WebhookPublisher::new("http://localhost:9000/events").unwrap();
        assert_eq!(publisher.url(), "http://localhost:9000/events");
    }

    #[test]
    fn publish_error_display_http_status() {
        let err = PublishError::HttpStatus(502);
        assert_eq!(err.to_string(), "Event endpoint returned HTTP 502");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_error() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let publisher = WebhookPublisher::new("http://127.0.0.1:9/events").unwrap();
        let event = PlatformEvent::new(TemplateEvent::ApprovalRequested {
            template_id: uuid::Uuid::nil(),
            reviewer_id: "r1".into(),
        });
        let err = publisher.publish(&event).await.unwrap_err();
        assert!(matches!(err, PublishError::Request(_)));
    }
}
