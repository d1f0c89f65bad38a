//! Daemon entry point for the Azure Table Storage MCP server.
//!
//! Loads configuration from the environment, connects the table store once,
//! and serves the MCP protocol over stdio or streamable HTTP.

mod config;

use aztable_core::control::TableControlPlane;
use aztable_core::store::AzureTableStore;
use aztable_mcp::server::{ServeError, cancel_on_ctrl_c, serve_stdio, serve_streamable_http};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AzTableConfig, Transport};

fn main() -> Result<(), ServeError> {
    init_tracing();
    let config = AzTableConfig::from_args();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(config));
    // The stdin reader stays parked in a blocking read until input arrives.
    runtime.shutdown_background();
    result
}

async fn run(config: AzTableConfig) -> Result<(), ServeError> {
    let shutdown = cancel_on_ctrl_c();

    if config.uses_development_storage() {
        info!("no connection string configured, using local development storage");
    }
    let store = AzureTableStore::from_connection_string(config.connection_string())?;
    let control = TableControlPlane::new(store);

    match config.transport {
        Transport::Stdio => serve_stdio(control, shutdown.cancelled_owned()).await?,
        Transport::Http => {
            serve_streamable_http(control, config.http_config(), shutdown.cancelled_owned())
                .await?;
        }
    }
    Ok(())
}

/// Logs go to stderr; stdout carries the stdio transport.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
