//! JSON-RPC 2.0 envelope types used by the HTTP transport.

use serde::{Deserialize, Deserializer, Serialize};

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// `None` when the member is absent; an explicit `null` is kept as `Some(Null)`.
    #[serde(default, deserialize_with = "present_value")]
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// A message without an id expects no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Request ids must be strings or numbers when present.
    pub fn has_valid_id(&self) -> bool {
        matches!(
            self.id,
            None | Some(serde_json::Value::String(_)) | Some(serde_json::Value::Number(_))
        )
    }
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Parse error: the body was not valid JSON.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::error(None, PARSE_ERROR, msg)
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, INVALID_REQUEST, msg)
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<serde_json::Value>, method: &str) -> Self {
        Self::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, INVALID_PARAMS, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, INTERNAL_ERROR, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_omits_error() {
        let response =
            JsonRpcResponse::success(Some(serde_json::json!(7)), serde_json::json!({}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, serde_json::json!({ "jsonrpc": "2.0", "id": 7, "result": {} }));
    }

    #[test]
    fn test_error_shape() {
        let response = JsonRpcResponse::method_not_found(Some(serde_json::json!("a")), "nope");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["error"]["message"], "Method not found: nope");
        assert!(value.get("result").is_none());
        assert!(value["error"].get("data").is_none());
    }

    #[test]
    fn test_request_notification() {
        let request: JsonRpcRequest = serde_json::from_value(serde_json::json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(request.is_notification());
        assert!(request.has_valid_id());
        assert!(request.params.is_none());
    }

    #[test]
    fn test_request_null_id_is_not_a_notification() {
        let request: JsonRpcRequest = serde_json::from_value(serde_json::json!({
            "jsonrpc": "2.0",
            "id": null,
            "method": "tools/call"
        }))
        .unwrap();
        assert!(!request.is_notification());
        assert!(!request.has_valid_id());
    }

    #[test]
    fn test_request_id_kinds() {
        let parse = |id: serde_json::Value| -> JsonRpcRequest {
            let message = serde_json::json!({ "jsonrpc": "2.0", "id": id, "method": "ping" });
            serde_json::from_value(message).unwrap()
        };
        assert!(parse(serde_json::json!(1)).has_valid_id());
        assert!(parse(serde_json::json!("abc")).has_valid_id());
        assert!(!parse(serde_json::json!([1])).has_valid_id());
    }
}
