//! MCP session manager.
//!
//! Owns the per-client sessions of the HTTP endpoint. Its lifespan is driven
//! by the host application through [`SessionManager::start`] and
//! [`SessionManager::stop`]; requests are refused while it is stopped.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info};

/// Header carrying the session id in both directions.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// State kept for a client session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub initialized: bool,
    pub protocol_version: String,
}

/// Tracks live sessions for the MCP endpoint.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    running: Arc<AtomicBool>,
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Startup hook.
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        info!("MCP session manager started");
    }

    /// Shutdown hook. Drops every session.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let mut sessions = self.sessions.write().await;
        let dropped = sessions.len();
        sessions.clear();
        info!("MCP session manager stopped ({} sessions closed)", dropped);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Open a session and return its id.
    pub async fn create(&self, protocol_version: impl Into<String>) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let state = SessionState {
            initialized: false,
            protocol_version: protocol_version.into(),
        };
        self.sessions.write().await.insert(id.clone(), state);
        debug!("Session {} created", id);
        id
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn get(&self, id: &str) -> Option<SessionState> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Record the client's `notifications/initialized`, returning the updated state.
    pub async fn mark_initialized(&self, id: &str) -> Option<SessionState> {
        let mut sessions = self.sessions.write().await;
        let state = sessions.get_mut(id)?;
        state.initialized = true;
        Some(state.clone())
    }

    /// Terminate a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            debug!("Session {} terminated", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
