//! Deployment quiz service binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::Notifier;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quiz::prober::ProcessEnv;
use quiz::{build_router, AppState, Config, KubeInspector};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("quiz=info".parse()?))
        .init();

    info!("Starting deployment quiz...");

    let config = Config::default();
    info!(
        deployment = %config.deployment_name,
        namespace_override = ?config.namespace_override,
        hide_quiz = config.hide_quiz,
        shuffle = config.shuffle_questions,
        timeout_secs = config.request_timeout.as_secs(),
        "Loaded configuration"
    );

    let kube_client = kube::Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let inspector = KubeInspector::new(kube_client, config.request_timeout);

    let notifier =
        Notifier::from_webhook_url(config.webhook_url.as_deref(), config.request_timeout);
    if !notifier.has_channels() {
        warn!("Completion notifications are off");
    }

    let port = config.port;
    let state = AppState::new(config, Arc::new(inspector), Arc::new(ProcessEnv), notifier)?;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port, "Deployment quiz listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
