//! # paybridge - Binary Entry Point
//!
//! Loads configuration, builds the gateway and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use paybridge::adapters::{http, notify};
use paybridge::application::PaymentGateway;
use paybridge::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let notifiers = notify::from_config(&config.notify)?;
    let gateway = Arc::new(PaymentGateway::from_config(&config, notifiers));
    if gateway.providers().is_empty() {
        tracing::warn!("no payment provider is configured; every order will be rejected");
    }

    let app = http::app(gateway, config.server.request_timeout());
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "paybridge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("paybridge stopped");
    Ok(())
}

/// JSON lines in production, human-readable output otherwise.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
