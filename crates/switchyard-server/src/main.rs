//! Switchyard server entry point.
//!
//! Loads settings (file, then flags and environment), builds the capability
//! catalog from the configured store and serves it over HTTP or stdio.

#![forbid(unsafe_code)]

use std::time::Duration;

use clap::Parser;

mod app;
mod cli;
mod config;

use cli::{Args, Transport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,switchyard=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = args.settings()?;

    tracing::info!(
        name = %settings.server.name,
        version = %settings.server.version,
        transport = ?args.transport,
        "Starting switchyard"
    );

    let catalog = app::load_catalog(&settings).await?;

    match args.transport {
        Transport::Stdio => {
            switchyard_mcp::serve_stdio(catalog.current()).await?;
        }
        Transport::Http => {
            let refresh = catalog.spawn_refresh(Duration::from_secs(settings.catalog.refresh_secs));
            let router =
                switchyard_mcp::router(catalog, &settings.auth, settings.allowed_hosts());

            tracing::info!(bind = %settings.server.bind, auth = ?settings.auth.mode, "Serving MCP over HTTP");
            switchyard_mcp::serve_http(router, &settings.server.bind, shutdown_signal()).await?;

            if let Some(handle) = refresh {
                handle.abort();
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
