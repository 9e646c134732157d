//! Structured audit log of session events.
//!
//! [`EventLog`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes every received [`SessionEvent`] as a
//! `tracing` event. It runs as a long-lived background task and shuts down
//! when the bus sender is dropped.

use tokio::sync::broadcast;

use crate::bus::SessionEvent;

/// Background service that logs every session event.
pub struct EventLog;

impl EventLog {
    /// Run the logging loop until the channel closes.
    ///
    /// Returns the number of events logged.
    pub async fn run(mut receiver: broadcast::Receiver<SessionEvent>) -> u64 {
        let mut logged = 0u64;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    Self::record(&event);
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event log lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(logged, "Event bus closed, event log shutting down");
                    break;
                }
            }
        }
        logged
    }

    fn record(event: &SessionEvent) {
        let change = serde_json::to_string(&event.change).unwrap_or_default();
        tracing::info!(
            target: "stylemark_events::audit",
            event_type = event.event_type,
            session_id = %event.session_id,
            revision = event.revision,
            %change,
            "Session event"
        );
    }
}
