//! Resolves the namespace the quiz runs in.

use std::path::PathBuf;

use tracing::debug;

use crate::config::Config;
use crate::error::{QuizError, Result};

/// Where the namespace string comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceSource {
    /// Fixed value from configuration.
    Fixed(String),
    /// Mounted file, re-read on every request.
    File(PathBuf),
}

impl NamespaceSource {
    pub fn from_config(config: &Config) -> Self {
        match &config.namespace_override {
            Some(ns) => Self::Fixed(ns.clone()),
            None => Self::File(config.namespace_file.clone()),
        }
    }

    /// Read the namespace, trimmed of surrounding whitespace.
    pub async fn resolve(&self) -> Result<String> {
        match self {
            Self::Fixed(ns) => Ok(ns.clone()),
            Self::File(path) => {
                let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                    QuizError::NamespaceUnavailable {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                })?;
                let namespace = raw.trim();
                if namespace.is_empty() {
                    return Err(QuizError::NamespaceUnavailable {
                        path: path.clone(),
                        reason: "file is empty".to_string(),
                    });
                }
                debug!(namespace = %namespace, path = %path.display(), "Resolved namespace");
                Ok(namespace.to_string())
            }
        }
    }
}
