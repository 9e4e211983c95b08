//! HTTP transport implementation.
//!
//! A host application serving a landing route and a health check, with the
//! MCP sub-application mounted at the configured path. The host drives the
//! sub-application's lifespan: startup before the listener accepts requests,
//! shutdown once it has drained.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use http::HeaderName;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::mcp_app::McpApp;
use super::session::SESSION_HEADER;
use super::{TransportConfig, TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// State of the host routes.
#[derive(Clone)]
struct HostState {
    name: String,
    mcp_path: String,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Create from TransportConfig (extracts HTTP config).
    pub fn from_transport_config(config: &TransportConfig) -> Option<Self> {
        match config {
            TransportConfig::Http(http_config) => Some(Self::new(http_config.clone())),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the MCP sub-application for `server`.
    pub fn mcp_app(&self, server: McpServer) -> McpApp {
        McpApp::new(server, self.config.rpc_path.clone())
    }

    /// Build the host router with `mcp` mounted on it.
    pub fn app(&self, name: impl Into<String>, mcp: &McpApp) -> Router {
        let state = HostState {
            name: name.into(),
            mcp_path: mcp.path().to_string(),
        };

        let mut app = Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .with_state(state)
            .merge(mcp.router())
            .layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([HeaderName::from_static(SESSION_HEADER)]);
            app = app.layer(cors);
        }

        app
    }

    /// Bind the listener on the configured address.
    pub async fn bind(&self) -> TransportResult<TcpListener> {
        let addr = self.address();
        TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))
    }

    /// Run the HTTP transport until Ctrl-C / SIGTERM.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let listener = self.bind().await?;
        self.serve(listener, server, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        server: McpServer,
        shutdown: F,
    ) -> TransportResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = server.name().to_string();
        let mcp = self.mcp_app(server);
        let app = self.app(name, &mcp);
        let local_addr = listener.local_addr()?;

        mcp.startup().await;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (JSON-RPC over HTTP, CORS {})",
            local_addr, cors_status
        );
        info!("  → JSON-RPC: POST {}/", mcp.path());
        info!("  → Landing:  GET /");
        info!("  → Health:   GET /health");

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| TransportError::http(e.to_string()));

        mcp.shutdown().await;
        info!("HTTP transport finished");

        served
    }
}

/// Resolve on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Root handler - liveness plus a pointer to the MCP endpoint.
async fn root_handler(State(state): State<HostState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": format!(
            "{} running. MCP endpoint at {}/ (POST JSON-RPC).",
            state.name, state.mcp_path
        )
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
