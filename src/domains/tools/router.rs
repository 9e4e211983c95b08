//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! Each tool knows how to create its own route.

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::SumTwoNumbersTool;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>() -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new().with_route(SumTwoNumbersTool::create_route())
}
