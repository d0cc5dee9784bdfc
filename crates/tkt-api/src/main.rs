//! # tkt-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the compliance ticket API.
//! Binds to a configurable port (default 8080).

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tkt_api::config::{AppConfig, LogFormat};
use tkt_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    init_tracing(config.log_format);
    tracing::debug!(?config, "configuration loaded");

    let mut state = AppState::from_config(&config).await?;

    if config.metrics {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("installing Prometheus recorder")?;
        state = state.with_prometheus(handle);
    }

    tracing::info!(
        backend = state.tickets.backend(),
        supersede_scope = %config.supersede_scope,
        "ticket service ready"
    );

    let app = tkt_api::app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Ticket API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}
