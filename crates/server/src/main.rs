//! ChainCast IDS - network metric ingestion and gas spike alerting
//!
//! Accepts metric reports over HTTP, raises alerts on gas price spikes,
//! and streams both to WebSocket subscribers.

use anyhow::Result;
use chaincast_ids::{api, AppState, ServerConfig};
use ids_lib::{BroadcastHub, GasSpikeDetector, Pipeline, StructuredLogger};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting chaincast-ids");

    let config = ServerConfig::load()?;
    let addr = config.listen_addr();

    let logger = StructuredLogger::new(&addr);

    let hub = Arc::new(
        BroadcastHub::new(config.subscriber_queue_capacity).with_logger(logger.clone()),
    );
    let pipeline = Arc::new(
        Pipeline::new(hub.clone())
            .with_detector(GasSpikeDetector::new(config.spike_multiplier))
            .with_logger(logger.clone()),
    );
    info!(
        addr = %addr,
        queue_capacity = hub.queue_capacity(),
        keepalive_secs = config.keepalive_interval_secs,
        spike_multiplier = config.spike_multiplier,
        "Server configured"
    );

    let app_state = Arc::new(AppState::new(
        pipeline,
        Duration::from_secs(config.keepalive_interval_secs),
    ));

    // Bind up front so a taken port fails startup
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    logger.log_startup(SERVER_VERSION, &addr);

    let closed = api::serve(listener, app_state, shutdown_signal()).await?;

    logger.log_shutdown("signal received", closed);
    info!("Graceful shutdown complete");

    Ok(())
}

/// Resolves on SIGINT (Ctrl-C) or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
