//! Transport configuration types.

use serde::{Deserialize, Serialize};
#[cfg(feature = "http")]
use tracing::warn;

use crate::core::error::{Error, Result};

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport.
    #[cfg(feature = "stdio")]
    Stdio,

    /// HTTP host application with the MCP endpoint mounted on it.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Mount path of the MCP sub-application.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

#[cfg(feature = "http")]
pub const DEFAULT_PORT: u16 = 8000;

#[cfg(feature = "http")]
fn default_port() -> u16 {
    DEFAULT_PORT
}

#[cfg(feature = "http")]
fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

/// Parse a port value as read from the environment.
///
/// Missing values yield [`DEFAULT_PORT`]; unparsable ones are logged and
/// also yield the default.
#[cfg(feature = "http")]
pub fn parse_port(value: Option<&str>) -> u16 {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_PORT,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid PORT value {:?}, falling back to {}", raw, DEFAULT_PORT);
            DEFAULT_PORT
        }),
    }
}

/// Normalize a mount path: leading slash enforced, trailing slashes dropped.
#[cfg(feature = "http")]
pub fn normalize_rpc_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    format!("/{}", trimmed)
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "http")]
        {
            return Self::Http(HttpConfig::default());
        }

        #[cfg(all(not(feature = "http"), feature = "stdio"))]
        {
            return Self::Stdio;
        }

        #[cfg(not(any(feature = "stdio", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or http");
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

impl TransportConfig {
    /// Create an HTTP transport config.
    #[cfg(feature = "http")]
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Load transport config from environment variables.
    ///
    /// `MCP_TRANSPORT` selects the transport (`http` unless it says `stdio`).
    /// The HTTP transport reads `PORT`, `HOST`, `MCP_HTTP_PATH` and
    /// `MCP_HTTP_CORS`.
    pub fn from_env() -> Self {
        let transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Self::Stdio,
            #[cfg(feature = "http")]
            _ => {
                let port = parse_port(std::env::var("PORT").ok().as_deref());
                let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
                let rpc_path = std::env::var("MCP_HTTP_PATH")
                    .map(|p| normalize_rpc_path(&p))
                    .unwrap_or_else(|_| default_rpc_path());
                let enable_cors = std::env::var("MCP_HTTP_CORS")
                    .map(|v| v.to_lowercase() != "false" && v != "0")
                    .unwrap_or(true);
                Self::Http(HttpConfig {
                    port,
                    host,
                    rpc_path,
                    enable_cors,
                })
            }
            #[cfg(not(feature = "http"))]
            _ => Self::Stdio,
        }
    }

    /// Reject settings the transport cannot serve.
    pub fn validate(&self) -> Result<()> {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => Ok(()),
            #[cfg(feature = "http")]
            Self::Http(cfg) => {
                if cfg.rpc_path == "/" || cfg.rpc_path == "/health" {
                    return Err(Error::config(format!(
                        "MCP path {} collides with a host route",
                        cfg.rpc_path
                    )));
                }
                if !cfg.rpc_path.starts_with('/') {
                    return Err(Error::config(format!(
                        "MCP path {} must start with '/'",
                        cfg.rpc_path
                    )));
                }
                // The router treats these as captures or wildcards.
                let has_pattern = cfg.rpc_path.contains(['{', '}'])
                    || cfg
                        .rpc_path
                        .split('/')
                        .any(|segment| segment.starts_with([':', '*']));
                if has_pattern {
                    return Err(Error::config(format!(
                        "MCP path {} must be a literal path",
                        cfg.rpc_path
                    )));
                }
                Ok(())
            }
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_path),
        }
    }
}
