//! Transport layer for the MCP server.
//!
//! This module provides different transport implementations:
//! - **HTTP**: host application with the MCP endpoint mounted on it - feature: `http`
//! - **STDIO**: Standard input/output - feature: `stdio`
//!
//! Each transport handles the connection lifecycle and delegates
//! message processing to the MCP server handler.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub mod jsonrpc;

#[cfg(feature = "http")]
pub mod mcp_app;

#[cfg(feature = "http")]
pub mod session;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::{DEFAULT_PORT, HttpConfig, normalize_rpc_path, parse_port};

#[cfg(feature = "http")]
pub use mcp_app::McpApp;
