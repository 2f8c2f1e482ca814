//! Kubernetes deployment quiz.
//!
//! Serves a short quiz asking the player to edit a Deployment until its
//! replica count and resource requests match values derived from the
//! namespace, and to set a few environment variables. Progress travels in
//! the URL, so the server holds no per-player state.
//!
//! - [`answers`] derives the expected values from the namespace
//! - [`inspector`] reads the live Deployment
//! - [`prober`] reads the free-text answers from the environment
//! - [`sequencer`] orders the questions and decides each request's outcome
//! - [`render`] turns the outcome into HTML
//! - [`server`] wires it into an axum router

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod answers;
pub mod config;
pub mod error;
pub mod inspector;
pub mod namespace;
pub mod prober;
pub mod render;
pub mod sequencer;
pub mod server;

pub use config::Config;
pub use error::{LookupError, QuizError};
pub use inspector::{DeploymentInspector, DeploymentSnapshot, KubeInspector};
pub use server::{build_router, AppState};
