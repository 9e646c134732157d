//! Stylemark session event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`SessionEvent`]: a session change plus the session it belongs to.
//! - [`EventLog`]: background task that writes every event to `tracing`.

pub mod bus;
pub mod log;

pub use bus::{EventBus, SessionEvent};
pub use log::EventLog;
