//! Plain JSON webhook channel.
//!
//! Posts `{"content": "..."}` bodies, the shape accepted by Discord-style
//! incoming webhooks.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::events::NotifyEvent;
use crate::NotifyChannel;

/// Webhook notification channel.
pub struct WebhookChannel {
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    /// Create a webhook channel with a specific URL and delivery timeout.
    #[must_use]
    pub fn new(webhook_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build webhook client, using defaults");
                reqwest::Client::new()
            });

        Self {
            webhook_url,
            client,
        }
    }

    fn format_payload(event: &NotifyEvent) -> WebhookPayload {
        WebhookPayload {
            content: event.content(),
        }
    }
}

#[async_trait]
impl NotifyChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    async fn send(&self, event: &NotifyEvent) -> Result<(), ChannelError> {
        if self.webhook_url.is_empty() {
            return Err(ChannelError::NotConfigured("webhook URL".to_string()));
        }

        let payload = Self::format_payload(event);

        debug!(channel = "webhook", event_type = %event.title(), "Sending notification");

        let response = self.client.post(&self.webhook_url).json(&payload).send().await?;
        let status = response.status();

        if status.is_success() {
            debug!(channel = "webhook", "Notification sent successfully");
            Ok(())
        } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(5);

            warn!(
                channel = "webhook",
                retry_after_secs = retry_after,
                "Rate limited by webhook endpoint"
            );

            Err(ChannelError::RateLimited {
                retry_after_secs: retry_after,
            })
        } else {
            let body = response.text().await.unwrap_or_default();

            warn!(
                channel = "webhook",
                status = %status,
                body = %body,
                "Webhook request failed"
            );

            Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn event() -> NotifyEvent {
        NotifyEvent::QuizCompleted {
            name: "Ada".to_string(),
            arise_id: Some("A-42".to_string()),
            namespace: "team-a".to_string(),
            image: None,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_posts_content_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(json!({
                "content": "Ada (Arise ID: A-42) completed the deployment quiz in namespace `team-a`"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let channel = WebhookChannel::new(format!("{}/hook", server.uri()), TIMEOUT);
        assert!(channel.enabled());
        channel.send(&event()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let channel = WebhookChannel::new(server.uri(), TIMEOUT);
        let err = channel.send(&event()).await.unwrap_err();
        assert!(matches!(err, ChannelError::Rejected { status: 500, ref body } if body == "boom"));
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "12"))
            .mount(&server)
            .await;

        let channel = WebhookChannel::new(server.uri(), TIMEOUT);
        let err = channel.send(&event()).await.unwrap_err();
        assert!(matches!(
            err,
            ChannelError::RateLimited {
                retry_after_secs: 12
            }
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_channel_refuses_to_send() {
        let channel = WebhookChannel::new(String::new(), TIMEOUT);
        assert!(!channel.enabled());
        let err = channel.send(&event()).await.unwrap_err();
        assert!(matches!(err, ChannelError::NotConfigured(_)));
    }
}
