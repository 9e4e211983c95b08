//! Sum tool definition.
//!
//! A tool that adds two numbers and returns their sum.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Content, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::common::{deserialize_lax_f64, format_number};
use crate::domains::tools::ToolError;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the sum tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SumTwoNumbersParams {
    /// First addend.
    #[serde(deserialize_with = "deserialize_lax_f64")]
    #[schemars(with = "f64")]
    pub a: f64,

    /// Second addend.
    #[serde(deserialize_with = "deserialize_lax_f64")]
    #[schemars(with = "f64")]
    pub b: f64,
}

/// Structured output of the sum tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SumTwoNumbersOutput {
    pub result: f64,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Sum tool - returns `a + b`.
pub struct SumTwoNumbersTool;

impl SumTwoNumbersTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "sum_two_numbers";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Return the sum of two numbers.\n\
        Example call:\n\
        {\"name\": \"sum_two_numbers\", \"arguments\": {\"a\": 2, \"b\": 3}}";

    /// The arithmetic itself.
    pub fn add(a: f64, b: f64) -> f64 {
        a + b
    }

    /// Execute the tool logic (for STDIO transport via rmcp).
    #[instrument(skip_all, fields(a = params.a, b = params.b))]
    pub fn execute(params: &SumTwoNumbersParams) -> CallToolResult {
        let sum = Self::add(params.a, params.b);
        debug!("sum_two_numbers -> {}", sum);

        let mut result = CallToolResult::success(vec![Content::text(format_number(sum))]);
        result.structured_content = Some(serde_json::json!({ "result": sum }));
        result
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub fn http_handler(arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let params = Self::parse_arguments(arguments)?;
        let result = Self::execute(&params);

        Ok(serde_json::json!({
            "content": result.content,
            "structuredContent": result.structured_content,
            "isError": result.is_error.unwrap_or(false)
        }))
    }

    /// Decode raw JSON arguments into typed parameters.
    pub fn parse_arguments(arguments: serde_json::Value) -> Result<SumTwoNumbersParams, ToolError> {
        serde_json::from_value(arguments).map_err(|e| {
            ToolError::invalid_arguments(format!("{}: {}", Self::NAME, e))
        })
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<SumTwoNumbersParams>(),
            annotations: None,
            output_schema: Some(cached_schema_for_type::<SumTwoNumbersOutput>()),
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO transport.
    pub fn create_route<S>() -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            async move {
                let params = Self::parse_arguments(serde_json::Value::Object(args))
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params))
            }
            .boxed()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            rmcp::model::RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        }
    }

    fn params(a: f64, b: f64) -> SumTwoNumbersParams {
        SumTwoNumbersParams { a, b }
    }

    #[test]
    fn test_add_scenarios() {
        assert_eq!(SumTwoNumbersTool::add(2.0, 3.0), 5.0);
        assert_eq!(SumTwoNumbersTool::add(-1.5, 1.5), 0.0);
    }

    #[test]
    fn test_add_is_commutative() {
        let samples = [0.0, -0.0, 1.0, -7.25, 0.1, 0.2, 1e308, -1e-308, 123456.789];
        for &a in &samples {
            for &b in &samples {
                assert_eq!(SumTwoNumbersTool::add(a, b), SumTwoNumbersTool::add(b, a));
                assert_eq!(SumTwoNumbersTool::add(a, b), a + b);
            }
        }
    }

    #[test]
    fn test_add_follows_float_semantics() {
        assert_eq!(SumTwoNumbersTool::add(0.1, 0.2), 0.1 + 0.2);
        assert!(SumTwoNumbersTool::add(f64::MAX, f64::MAX).is_infinite());
    }

    #[test]
    fn test_execute_returns_text_and_structured_content() {
        let result = SumTwoNumbersTool::execute(&params(2.0, 3.0));
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(text_of(&result), "5.0");
        assert_eq!(
            result.structured_content,
            Some(serde_json::json!({ "result": 5.0 }))
        );
    }

    #[test]
    fn test_parse_arguments_coerces_strings() {
        let parsed =
            SumTwoNumbersTool::parse_arguments(serde_json::json!({ "a": "2", "b": 3 })).unwrap();
        assert_eq!(parsed.a, 2.0);
        assert_eq!(parsed.b, 3.0);
    }

    #[test]
    fn test_parse_arguments_missing_field() {
        let err = SumTwoNumbersTool::parse_arguments(serde_json::json!({ "a": 1 })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(err.to_string().contains("`b`"));
    }

    #[test]
    fn test_to_tool_metadata() {
        let tool = SumTwoNumbersTool::to_tool();
        assert_eq!(tool.name, SumTwoNumbersTool::NAME);
        let props = tool
            .input_schema
            .get("properties")
            .and_then(|p| p.as_object())
            .expect("input schema has properties");
        assert!(props.contains_key("a"));
        assert!(props.contains_key("b"));
        assert!(tool.output_schema.is_some());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_handler() {
        let result =
            SumTwoNumbersTool::http_handler(serde_json::json!({ "a": -1.5, "b": 1.5 })).unwrap();
        assert_eq!(result["structuredContent"]["result"], serde_json::json!(0.0));
        assert_eq!(result["isError"], serde_json::json!(false));
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "0.0");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_handler_invalid_arguments() {
        let result = SumTwoNumbersTool::http_handler(serde_json::json!({ "a": "x", "b": 1 }));
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
