//! Steer Agent - Main Entry Point
//!
//! Long-running daemon that keeps the endpoint dataset current. Query
//! consumers embed `steer-endpoints` and read from the shared store.

use std::sync::Arc;

use steer_endpoints::{DatasetStore, EndpointsConfig, HttpPublicationSource, RefreshScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Steer Agent v{}", env!("CARGO_PKG_VERSION"));

    // Load config
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "/etc/cloudsteer/agent.json".into());

    let config = EndpointsConfig::load(&config_path).unwrap_or_else(|_| {
        tracing::warn!("Config not found, using defaults");
        EndpointsConfig::default()
    });
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    tracing::info!(
        service_url = %config.service_url,
        instance = %config.instance,
        version_check_secs = config.version_check_interval_secs,
        refresh_secs = config.refresh_interval_secs,
        "Starting endpoint ingestion"
    );

    let source = Arc::new(HttpPublicationSource::new(&config)?);
    let store = Arc::new(DatasetStore::new());
    let scheduler = Arc::new(RefreshScheduler::new(source, Arc::clone(&store), &config));

    let (version_loop, refresh_loop) = Arc::clone(&scheduler).spawn();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received SIGINT, shutting down");

    version_loop.abort();
    refresh_loop.abort();

    let stats = scheduler.stats();
    tracing::info!(
        version_checks = stats.version_checks,
        refreshes = stats.refreshes,
        failures = stats.failures,
        generations = stats.generations_published,
        "Shutdown complete"
    );

    Ok(())
}
