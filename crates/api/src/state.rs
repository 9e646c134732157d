use std::sync::Arc;

use crate::config::ServerConfig;
use crate::sessions::SessionRegistry;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Live labelling sessions.
    pub sessions: Arc<SessionRegistry>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Event bus for session change events.
    pub event_bus: Arc<stylemark_events::EventBus>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new(config.max_sessions)),
            config: Arc::new(config),
            ws_manager: Arc::new(WsManager::new()),
            event_bus: Arc::new(stylemark_events::EventBus::default()),
        }
    }
}
