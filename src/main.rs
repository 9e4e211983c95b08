//! MCP Server Entry Point
//!
//! Loads configuration from the environment, initializes logging and starts
//! the server with the configured transport (HTTP on `$PORT` by default).

use anyhow::Result;
use tracing::info;

use sum_mcp_server::core::{Config, McpServer, TransportService, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    logging::init(&config.logging);

    config.validate()?;

    info!("Starting {} v{}", config.server.name, config.server.version);

    let server = McpServer::new(config.clone());

    TransportService::new(config.transport).run(server).await?;

    info!("Server shutting down");

    Ok(())
}
