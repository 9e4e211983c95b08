//! STDIO transport implementation.
//!
//! Serves the MCP server over stdin/stdout through rmcp. Logs go to stderr,
//! so stdout carries protocol messages only.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport until the client closes the stream.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        let running = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        if let Some(peer) = running.peer_info() {
            info!(
                "Client connected over stdio: {} {}",
                peer.client_info.name, peer.client_info.version
            );
        }

        let reason = running
            .waiting()
            .await
            .map_err(|e| TransportError::ServiceError(e.to_string()))?;

        info!("STDIO transport finished: {:?}", reason);
        Ok(())
    }
}
