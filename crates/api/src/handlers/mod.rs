pub mod annotation;
pub mod csv;
pub mod image;
pub mod navigation;
pub mod session;
pub mod stats;

use stylemark_core::types::SessionId;
use stylemark_core::ChangeEvent;

use crate::state::AppState;

/// Publish a session change on the event bus and hand it back.
pub(crate) fn publish(state: &AppState, session_id: SessionId, change: ChangeEvent) -> ChangeEvent {
    state.event_bus.publish_change(session_id, change.clone());
    change
}
