//! Memory Match Server
//!
//! Runs a single shared match on the configured address until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use memory_match::{GameServer, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;

    info!("Memory Match Server v{}", VERSION);
    info!(
        "{} card values, {} ms mismatch delay, {} moves of history",
        config.match_config.card_values.len(),
        config.match_config.mismatch_delay.as_millis(),
        config.match_config.history_limit
    );

    let server = Arc::new(GameServer::new(config));

    let signal_server = Arc::clone(&server);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal_server.shutdown(),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    server.run().await.context("server failed")?;
    info!("Server stopped");
    Ok(())
}
