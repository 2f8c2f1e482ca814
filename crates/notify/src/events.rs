//! Notification event types for the deployment quiz.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events that can trigger notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifyEvent {
    /// Every quiz question passed and the player advanced past the last one.
    QuizCompleted {
        /// Value of the player's name variable.
        name: String,
        /// Value of the player's Arise ID variable, if set.
        #[serde(default)]
        arise_id: Option<String>,
        /// Namespace the quiz was played in.
        namespace: String,
        /// Image URL the player picked, if set.
        #[serde(default)]
        image: Option<String>,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
}

impl NotifyEvent {
    /// Get a short title for this event type.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::QuizCompleted { namespace, .. } => format!("Quiz Completed: {namespace}"),
        }
    }

    /// Render the one-line message body sent to plain-text webhooks.
    #[must_use]
    pub fn content(&self) -> String {
        match self {
            Self::QuizCompleted {
                name,
                arise_id,
                namespace,
                ..
            } => {
                let id = arise_id.as_deref().unwrap_or("unknown");
                format!(
                    "{name} (Arise ID: {id}) completed the deployment quiz in namespace `{namespace}`"
                )
            }
        }
    }

    /// Get the timestamp for this event.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::QuizCompleted { timestamp, .. } => *timestamp,
        }
    }
}
