//! Sum MCP Server Library
//!
//! A small Model Context Protocol (MCP) server exposing one tool,
//! `sum_two_numbers`. Over HTTP the MCP endpoint is mounted inside a host
//! application that also answers a landing route (`GET /`) and a health check.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the server handler and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: MCP tools that can be executed by clients
//!
//! # Example
//!
//! ```rust,no_run
//! use sum_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone());
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
