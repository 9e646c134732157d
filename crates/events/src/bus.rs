//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`SessionEvent`]s. It is
//! shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::Serialize;
use stylemark_core::session::{ChangeEvent, ChangeKind};
use stylemark_core::types::SessionId;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// A state change that happened inside one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEvent {
    /// Dot-separated event name, e.g. `"annotation.saved"`.
    pub event_type: &'static str,

    /// Session the change belongs to.
    pub session_id: SessionId,

    /// Session revision after the change.
    pub revision: u64,

    /// What changed.
    pub change: ChangeKind,

    /// When the event was published (UTC).
    pub timestamp: DateTime<Utc>,
}

impl SessionEvent {
    pub fn new(session_id: SessionId, event: ChangeEvent) -> Self {
        Self {
            event_type: event.kind.name(),
            session_id,
            revision: event.revision,
            change: event.kind,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`SessionEvent`].
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: SessionEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Wrap a session's change and publish it.
    pub fn publish_change(&self, session_id: SessionId, change: ChangeEvent) {
        self.publish(SessionEvent::new(session_id, change));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stylemark_core::Session;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let mut session = Session::default();
        let change = session.load(["a.jpg", "b.jpg"], "shirts");
        bus.publish_change(session.id(), change);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "session.loaded");
        assert_eq!(received.session_id, session.id());
        assert_eq!(received.revision, 1);
        assert_eq!(received.change, ChangeKind::Loaded { images: 2 });
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let mut session = Session::default();
        bus.publish_change(session.id(), session.reset());

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, "session.reset");
        assert_eq!(e2.revision, e1.revision);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        let mut session = Session::default();
        bus.publish_change(session.id(), session.clear_annotations());
    }

    #[test]
    fn event_serializes_change_inline() {
        let mut session = Session::default();
        let event = SessionEvent::new(session.id(), session.clear_annotations());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "annotations.cleared");
        assert_eq!(json["change"]["type"], "annotations_cleared");
        assert_eq!(json["change"]["removed"], 0);
        assert_eq!(json["session_id"], session.id().to_string());
    }
}
