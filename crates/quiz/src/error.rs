//! Error types for the quiz service.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

/// Failures reading the target Deployment.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("deployment {name} not found in namespace {namespace}")]
    NotFound { name: String, namespace: String },

    #[error("not allowed to read deployment {name} in namespace {namespace}")]
    Forbidden { name: String, namespace: String },

    #[error("cluster API did not answer within {0:?}")]
    Timeout(Duration),

    #[error("cluster API error: {0}")]
    Api(String),
}

/// Errors that abort a quiz request.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The namespace could not be determined.
    #[error("namespace unavailable at {path:?}: {reason}")]
    NamespaceUnavailable { path: PathBuf, reason: String },

    /// The target Deployment could not be read.
    #[error(transparent)]
    DeploymentLookup(#[from] LookupError),

    /// A page template failed to render.
    #[error("failed to render page: {0}")]
    Render(#[from] handlebars::RenderError),

    /// The progress query parameter was malformed.
    #[error("invalid question parameter: {0}")]
    InvalidProgress(String),
}

pub type Result<T, E = QuizError> = std::result::Result<T, E>;

impl QuizError {
    /// HTTP status used when this error ends a request.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NamespaceUnavailable { .. } | Self::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::DeploymentLookup(LookupError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::DeploymentLookup(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidProgress(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Plain-text body shown to the player.
    pub fn user_message(&self) -> String {
        match self {
            Self::NamespaceUnavailable { .. } => {
                "Unable to find namespace. Make sure your pod has the necessary permissions."
                    .to_string()
            }
            Self::DeploymentLookup(e) => format!("Unable to read deployment: {e}"),
            Self::Render(_) => "Unable to render page.".to_string(),
            Self::InvalidProgress(raw) => {
                format!("Invalid question parameter '{raw}': expected a non-negative integer.")
            }
        }
    }
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = %status, "Quiz request failed");
        } else {
            warn!(error = %self, status = %status, "Rejected quiz request");
        }
        (status, self.user_message()).into_response()
    }
}
