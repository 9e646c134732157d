//! Bus-to-socket fan-out.
//!
//! [`EventForwarder`] subscribes to the session event bus and pushes each
//! event as a JSON text frame to the WebSocket connections following that
//! session.

use std::sync::Arc;

use axum::extract::ws::Message;
use stylemark_events::SessionEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

pub struct EventForwarder {
    ws_manager: Arc<WsManager>,
}

impl EventForwarder {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<SessionEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.forward(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event forwarder lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event forwarder shutting down");
                    break;
                }
            }
        }
    }

    async fn forward(&self, event: &SessionEvent) {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, event_type = event.event_type, "Failed to encode event");
                return;
            }
        };
        let delivered = self
            .ws_manager
            .send_to_session(event.session_id, Message::Text(text.into()))
            .await;
        tracing::trace!(
            session_id = %event.session_id,
            event_type = event.event_type,
            delivered,
            "Event forwarded"
        );
    }
}
