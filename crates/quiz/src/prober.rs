//! Free-text answers read from environment variables.

use std::collections::HashMap;
use std::sync::Arc;

use crate::answers::QuestionKey;
use crate::config::EnvNames;

/// Value treated as "unset", matching the placeholder players see.
pub const UNSET_PLACEHOLDER: &str = "NONE";

/// Source of environment variables.
pub trait EnvSource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads the process environment on every lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed variables, for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct StaticEnv(HashMap<String, String>);

impl StaticEnv {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl EnvSource for StaticEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Looks up the player's free-text answers.
#[derive(Clone)]
pub struct EnvironmentProber {
    source: Arc<dyn EnvSource>,
    names: EnvNames,
}

impl EnvironmentProber {
    pub fn new(source: Arc<dyn EnvSource>, names: EnvNames) -> Self {
        Self { source, names }
    }

    /// A variable counts as answered when set, non-empty and not `NONE`.
    fn lookup(&self, name: &str) -> Option<String> {
        self.source
            .get(name)
            .filter(|v| !v.is_empty() && v != UNSET_PLACEHOLDER)
    }

    pub fn your_name(&self) -> Option<String> {
        self.lookup(&self.names.your_name)
    }

    pub fn image(&self) -> Option<String> {
        self.names.image.iter().find_map(|name| self.lookup(name))
    }

    pub fn arise_id(&self) -> Option<String> {
        self.lookup(&self.names.arise_id)
    }

    /// Answer for a free-text question; `None` for deployment questions.
    pub fn answer(&self, key: QuestionKey) -> Option<String> {
        match key {
            QuestionKey::YourName => self.your_name(),
            QuestionKey::Image => self.image(),
            QuestionKey::AriseId => self.arise_id(),
            QuestionKey::Replicas | QuestionKey::CpuRequest | QuestionKey::MemoryRequest => None,
        }
    }

    /// Variable name shown to the player for a free-text question.
    pub fn variable_name(&self, key: QuestionKey) -> Option<&str> {
        match key {
            QuestionKey::YourName => Some(&self.names.your_name),
            QuestionKey::Image => self.names.image.first().map(String::as_str),
            QuestionKey::AriseId => Some(&self.names.arise_id),
            QuestionKey::Replicas | QuestionKey::CpuRequest | QuestionKey::MemoryRequest => None,
        }
    }

    /// Variable that currently holds the answer for `key`.
    ///
    /// Falls back to [`Self::variable_name`] when nothing is set.
    pub fn source_variable(&self, key: QuestionKey) -> Option<&str> {
        match key {
            QuestionKey::Image => self
                .names
                .image
                .iter()
                .find(|name| self.lookup(name).is_some())
                .map(String::as_str)
                .or_else(|| self.variable_name(key)),
            QuestionKey::YourName
            | QuestionKey::AriseId
            | QuestionKey::Replicas
            | QuestionKey::CpuRequest
            | QuestionKey::MemoryRequest => self.variable_name(key),
        }
    }
}
