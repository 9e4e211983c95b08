//! The MCP sub-application.
//!
//! A self-contained axum router answering JSON-RPC on a single path, meant to
//! be mounted inside a host application. Its lifespan hooks
//! ([`McpApp::startup`], [`McpApp::shutdown`]) must be driven by the host so
//! that the session manager runs for exactly as long as the host serves.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode};
use tracing::{debug, info, instrument, warn};

use super::jsonrpc::{JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse};
use super::session::{SESSION_HEADER, SessionManager};
use crate::core::{Error, McpServer};

/// Protocol revisions this endpoint speaks, newest first.
pub static SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] =
    ["2025-06-18", "2025-03-26", "2024-11-05"];

/// Pick the protocol version to answer an `initialize` with.
///
/// The client's requested revision is echoed when supported; otherwise the
/// newest supported one is offered.
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|r| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|v| **v == r))
        .copied()
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}

/// MCP endpoint mounted under a path of the host application.
#[derive(Clone)]
pub struct McpApp {
    server: McpServer,
    sessions: SessionManager,
    path: String,
}

impl McpApp {
    /// Create the sub-application serving `server` at `path`.
    pub fn new(server: McpServer, path: impl Into<String>) -> Self {
        Self {
            server,
            sessions: SessionManager::new(),
            path: path.into(),
        }
    }

    /// Mount path, without trailing slash.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Startup hook, to run before the host starts serving.
    pub async fn startup(&self) {
        self.sessions.start();
        info!("MCP endpoint ready at {}", self.path);
    }

    /// Shutdown hook, to run after the host stops serving.
    pub async fn shutdown(&self) {
        self.sessions.stop().await;
    }

    /// Routes of the sub-application, answering on `<path>` and `<path>/`.
    pub fn router(&self) -> Router {
        let with_slash = format!("{}/", self.path);
        Router::new()
            .route(&self.path, post(handle_post).delete(handle_delete))
            .route(&with_slash, post(handle_post).delete(handle_delete))
            .with_state(self.clone())
    }

    /// Dispatch a JSON-RPC request that expects a response.
    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request),
            method => {
                warn!("Unknown method: {}", method);
                JsonRpcResponse::method_not_found(request.id, method)
            }
        }
    }

    /// Handle initialize: open a session and describe the server.
    async fn handle_initialize(&self, request: JsonRpcRequest) -> (JsonRpcResponse, String) {
        let requested = request
            .params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str());
        let protocol_version = negotiate_protocol_version(requested);
        info!(
            "Processing initialize request (client asked {:?}, answering {})",
            requested, protocol_version
        );

        let session_id = self.sessions.create(protocol_version).await;

        let result = serde_json::json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": self.server.name(),
                "version": self.server.version()
            },
            "instructions": self.server.instructions()
        });

        (JsonRpcResponse::success(request.id, result), session_id)
    }

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Processing tools/list request");
        let tools = self.server.list_tools();
        JsonRpcResponse::success(request.id, serde_json::json!({ "tools": tools }))
    }

    fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params = match request.params {
            Some(p) => p,
            None => return JsonRpcResponse::invalid_params(request.id, "Missing params"),
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n,
            None => return JsonRpcResponse::invalid_params(request.id, "Missing tool name"),
        };

        let arguments = match params.get("arguments") {
            None | Some(serde_json::Value::Null) => serde_json::json!({}),
            Some(args @ serde_json::Value::Object(_)) => args.clone(),
            Some(_) => {
                return JsonRpcResponse::invalid_params(
                    request.id,
                    "Tool arguments must be an object",
                );
            }
        };

        info!("Calling tool: {}", name);
        match self.server.call_tool(name, arguments) {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(Error::Tool(e)) => JsonRpcResponse::invalid_params(request.id, e.to_string()),
            Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
        }
    }

    /// Handle a notification. Nothing is sent back.
    async fn handle_notification(&self, request: &JsonRpcRequest, session_id: Option<&str>) {
        match (request.method.as_str(), session_id) {
            ("notifications/initialized", Some(id)) => {
                if let Some(state) = self.sessions.mark_initialized(id).await {
                    info!(
                        "Client sent initialized notification (protocol {})",
                        state.protocol_version
                    );
                }
            }
            ("notifications/initialized", None) => {
                info!("Client sent initialized notification (stateless)");
            }
            (method, _) if method.starts_with("notifications/") => {
                debug!("Received notification: {}", method);
            }
            (method, _) => {
                warn!("Ignoring {} sent without an id", method);
            }
        }
    }
}

fn rpc_reply(status: StatusCode, response: JsonRpcResponse) -> Response {
    (status, Json(response)).into_response()
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Handle a JSON-RPC message posted to the endpoint.
#[instrument(skip_all, fields(method))]
async fn handle_post(State(app): State<McpApp>, headers: HeaderMap, body: Bytes) -> Response {
    if !app.sessions.is_running() {
        warn!("Request received while the MCP session manager is stopped");
        return rpc_reply(
            StatusCode::SERVICE_UNAVAILABLE,
            JsonRpcResponse::internal_error(None, "MCP session manager is not running"),
        );
    }

    let value: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return rpc_reply(
                StatusCode::BAD_REQUEST,
                JsonRpcResponse::parse_error(format!("Parse error: {}", e)),
            );
        }
    };

    let id_hint = value.get("id").cloned();
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            return rpc_reply(
                StatusCode::BAD_REQUEST,
                JsonRpcResponse::invalid_request(id_hint, format!("Invalid Request: {}", e)),
            );
        }
    };

    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    if request.jsonrpc != JSONRPC_VERSION {
        return rpc_reply(
            StatusCode::BAD_REQUEST,
            JsonRpcResponse::invalid_request(
                request.id,
                "Invalid Request: jsonrpc must be \"2.0\"",
            ),
        );
    }

    if !request.has_valid_id() {
        return rpc_reply(
            StatusCode::BAD_REQUEST,
            JsonRpcResponse::invalid_request(
                Some(serde_json::Value::Null),
                "Invalid Request: id must be a string or a number",
            ),
        );
    }

    let session = session_id(&headers);
    if let Some(id) = session.as_deref() {
        if !app.sessions.contains(id).await {
            warn!("Unknown session id: {}", id);
            return rpc_reply(
                StatusCode::NOT_FOUND,
                JsonRpcResponse::invalid_request(request.id, "Session not found"),
            );
        }
    }

    if request.is_notification() {
        app.handle_notification(&request, session.as_deref()).await;
        return StatusCode::ACCEPTED.into_response();
    }

    if request.method == "initialize" {
        let (response, new_session) = app.handle_initialize(request).await;
        let mut reply = rpc_reply(StatusCode::OK, response);
        match HeaderValue::from_str(&new_session) {
            Ok(value) => {
                reply.headers_mut().insert(SESSION_HEADER, value);
            }
            Err(e) => warn!("Session id is not a valid header value: {}", e),
        }
        return reply;
    }

    let response = app.dispatch(request).await;
    rpc_reply(StatusCode::OK, response)
}

/// Terminate the session named by the `mcp-session-id` header.
#[instrument(skip_all)]
async fn handle_delete(State(app): State<McpApp>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        return rpc_reply(
            StatusCode::BAD_REQUEST,
            JsonRpcResponse::invalid_request(None, "Missing mcp-session-id header"),
        );
    };

    if app.sessions.remove(&id).await {
        info!("Session {} closed by client", id);
        StatusCode::OK.into_response()
    } else {
        rpc_reply(
            StatusCode::NOT_FOUND,
            JsonRpcResponse::invalid_request(None, "Session not found"),
        )
    }
}
