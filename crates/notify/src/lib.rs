//! Completion notifications for the deployment quiz.
//!
//! This crate provides a fire-and-forget notification system that posts a
//! message to an external webhook when a player finishes the quiz.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use notify::{Notifier, NotifyEvent};
//!
//! let notifier = Notifier::from_webhook_url(
//!     Some("https://hooks.example/quiz"),
//!     Duration::from_secs(5),
//! );
//!
//! // Send a notification (fire-and-forget)
//! notifier.notify(NotifyEvent::QuizCompleted {
//!     name: "Ada".to_string(),
//!     arise_id: Some("A-42".to_string()),
//!     namespace: "team-a".to_string(),
//!     image: None,
//!     timestamp: chrono::Utc::now(),
//! });
//! ```
//!
//! # Configuration
//!
//! The webhook URL is supplied by the caller. `NOTIFY_DISABLED` is read here:
//!
//! - `NOTIFY_DISABLED`: Set to "true" to disable all notifications

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod events;

pub use channels::webhook::WebhookChannel;
pub use channels::NotifyChannel;
pub use error::ChannelError;
pub use events::NotifyEvent;

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable to disable all notifications.
const ENV_NOTIFY_DISABLED: &str = "NOTIFY_DISABLED";

fn disabled_by_env() -> bool {
    std::env::var(ENV_NOTIFY_DISABLED)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

/// Central notification dispatcher.
///
/// The `Notifier` manages notification channels and dispatches events to
/// all enabled channels in a fire-and-forget manner.
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
    disabled: bool,
}

impl Notifier {
    /// Create a notifier posting to `webhook_url`, if one is configured.
    ///
    /// `NOTIFY_DISABLED` still takes precedence.
    #[must_use]
    pub fn from_webhook_url(webhook_url: Option<&str>, timeout: Duration) -> Self {
        if disabled_by_env() {
            info!("Notifications disabled via NOTIFY_DISABLED");
            return Self::disabled();
        }

        match webhook_url.filter(|url| !url.is_empty()) {
            Some(url) => Self::from_channel(WebhookChannel::new(url.to_string(), timeout)),
            None => {
                warn!("No completion webhook configured");
                Self::with_channels(vec![])
            }
        }
    }

    fn from_channel(webhook: WebhookChannel) -> Self {
        let mut channels: Vec<Arc<dyn NotifyChannel>> = vec![];

        if webhook.enabled() {
            info!("Webhook notifications enabled");
            channels.push(Arc::new(webhook));
        }

        if channels.is_empty() {
            warn!("No notification channels configured");
        } else {
            info!(
                channel_count = channels.len(),
                "Notification system initialized"
            );
        }

        Self::with_channels(channels)
    }

    /// Create a notifier with specific channels.
    #[must_use]
    pub fn with_channels(channels: Vec<Arc<dyn NotifyChannel>>) -> Self {
        Self {
            channels,
            disabled: false,
        }
    }

    /// Create a disabled notifier (for testing or when notifications are off).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            channels: vec![],
            disabled: true,
        }
    }

    /// Check if any notification channels are enabled.
    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.disabled && !self.channels.is_empty()
    }

    /// Send a notification to all enabled channels (fire-and-forget).
    ///
    /// This method spawns async tasks for each channel and returns immediately.
    /// Errors are logged but not propagated to the caller.
    pub fn notify(&self, event: NotifyEvent) {
        if self.disabled {
            debug!("Notifications disabled, skipping event");
            return;
        }

        if self.channels.is_empty() {
            debug!("No channels configured, skipping event");
            return;
        }

        let event = Arc::new(event);

        for channel in &self.channels {
            let channel = Arc::clone(channel);
            let event = Arc::clone(&event);

            tokio::spawn(async move {
                let channel_name = channel.name();

                if !channel.enabled() {
                    debug!(channel = channel_name, "Channel disabled, skipping");
                    return;
                }

                match channel.send(&event).await {
                    Ok(()) => {
                        info!(channel = channel_name, event = %event.title(), "Notification sent");
                    }
                    Err(e) => {
                        warn!(
                            channel = channel_name,
                            error = %e,
                            "Failed to send notification"
                        );
                    }
                }
            });
        }
    }
}
