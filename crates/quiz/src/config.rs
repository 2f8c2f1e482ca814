//! Configuration for the quiz service.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Mounted service-account file holding the pod's namespace.
pub const DEFAULT_NAMESPACE_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Deployment the player is asked to fix.
pub const DEFAULT_DEPLOYMENT_NAME: &str = "k8s-deployment-quiz";

/// Quiz service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Name of the Deployment to inspect.
    pub deployment_name: String,
    /// Namespace override; takes precedence over `namespace_file`.
    pub namespace_override: Option<String>,
    /// File the namespace is read from when no override is set.
    pub namespace_file: PathBuf,
    /// Serve the all-at-once status board instead of the step-by-step quiz.
    pub hide_quiz: bool,
    /// Completion webhook URL.
    pub webhook_url: Option<String>,
    /// Upper bound on each cluster call and webhook delivery.
    pub request_timeout: Duration,
    /// Shuffle question order per namespace.
    pub shuffle_questions: bool,
    /// Values the expected answers are drawn from.
    pub candidates: Candidates,
    /// Environment variables holding the free-text answers.
    pub env_names: EnvNames,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("QUIZ_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(80),
            deployment_name: env::var("DEPLOYMENT_NAME")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_DEPLOYMENT_NAME.to_string()),
            namespace_override: env::var("NAMESPACE")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            namespace_file: env::var("NAMESPACE_FILE")
                .map_or_else(|_| PathBuf::from(DEFAULT_NAMESPACE_FILE), PathBuf::from),
            hide_quiz: env::var("HIDE_QUIZ").is_ok_and(|v| parse_flag(&v)),
            webhook_url: env::var("COMPLETION_WEBHOOK_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            request_timeout: Duration::from_secs(
                env::var("QUIZ_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(5),
            ),
            shuffle_questions: env::var("SHUFFLE_QUESTIONS").map_or(true, |v| parse_flag(&v)),
            candidates: Candidates::default(),
            env_names: EnvNames::default(),
        }
    }
}

/// Boolean-like environment values: `true`, `1`, `yes` (any case).
fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
}

/// Fixed candidate lists for the derived answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    pub replicas: Vec<i32>,
    pub cpu_requests: Vec<String>,
    pub memory_requests: Vec<String>,
}

impl Default for Candidates {
    fn default() -> Self {
        Self {
            replicas: vec![1, 2, 3, 4, 5],
            cpu_requests: vec!["250m".to_string(), "500m".to_string()],
            memory_requests: vec![
                "512Mi".to_string(),
                "768Mi".to_string(),
                "1024Mi".to_string(),
            ],
        }
    }
}

/// Names of the environment variables read as free-text answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvNames {
    pub your_name: String,
    /// Consulted in order; the first present value wins.
    pub image: Vec<String>,
    pub arise_id: String,
}

impl Default for EnvNames {
    fn default() -> Self {
        Self {
            your_name: "YOUR_NAME".to_string(),
            image: vec!["IMAGE_URL".to_string(), "IMAGE".to_string()],
            arise_id: "YOUR_ARISE_ID".to_string(),
        }
    }
}
