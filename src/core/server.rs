//! MCP Server implementation.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to the tools domain.
//!
//! The rmcp `ToolRouter` is built in `domains/tools/router.rs`; HTTP tool
//! calls go through the `ToolRegistry` instead.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;

use super::config::Config;
use crate::domains::tools::build_tool_router;

#[cfg(feature = "http")]
use crate::domains::tools::ToolRegistry;

/// Instructions sent to clients during initialization.
pub const INSTRUCTIONS: &str =
    "Example MCP server with a single tool, `sum_two_numbers`, that adds two numbers.";

/// The main MCP server handler.
///
/// Implements the `ServerHandler` trait from rmcp for the STDIO transport and
/// exposes plain methods for the HTTP transport.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            tool_router: build_tool_router::<Self>(),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server instructions.
    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                let mut entry = serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                });
                if let Some(output_schema) = t.output_schema {
                    entry["outputSchema"] = serde_json::json!(output_schema);
                }
                entry
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    #[cfg(feature = "http")]
    pub fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> super::Result<serde_json::Value> {
        Ok(ToolRegistry::new().call_tool(name, arguments)?)
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}
