//! WebSocket change feed.
//!
//! Provides connection management, heartbeat monitoring, the HTTP upgrade
//! handler and the task that fans session events out to sockets.

mod forwarder;
mod handler;
mod heartbeat;
pub mod manager;

pub use forwarder::EventForwarder;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
