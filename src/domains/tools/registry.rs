//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - HTTP dispatch for tool calls (when http feature is enabled)
//! - Tool metadata for listing

use rmcp::model::Tool;
#[cfg(feature = "http")]
use tracing::warn;

#[cfg(feature = "http")]
use super::ToolError;
use super::definitions::SumTwoNumbersTool;

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolRegistry;

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![SumTwoNumbersTool::NAME]
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// Both HTTP and STDIO transports use this to get tool metadata.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![SumTwoNumbersTool::to_tool()]
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    #[cfg(feature = "http")]
    pub fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        match name {
            SumTwoNumbersTool::NAME => SumTwoNumbersTool::http_handler(arguments),
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}
