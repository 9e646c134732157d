//! Registry of live labelling sessions.
//!
//! Each session sits behind its own mutex so a request holds exactly one
//! session for its whole duration, and sessions never block each other.

use std::collections::HashMap;
use std::sync::Arc;

use stylemark_core::error::CoreError;
use stylemark_core::types::SessionId;
use stylemark_core::Session;
use tokio::sync::{Mutex, RwLock};

use crate::error::{AppError, AppResult};

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Thread-safe map of session id to session, bounded by `capacity`.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Register a fresh session. Fails when the registry is full.
    pub async fn create(&self, session: Session) -> AppResult<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.capacity {
            tracing::warn!(capacity = self.capacity, "Session limit reached");
            return Err(AppError::TooManySessions(self.capacity));
        }
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(id, Arc::clone(&handle));
        tracing::info!(session_id = %id, open = sessions.len(), "Session created");
        Ok(handle)
    }

    /// Look up a session, mapping a miss to `NotFound`.
    pub async fn get(&self, id: SessionId) -> AppResult<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Session",
                    id: id.to_string(),
                })
            })
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session removed");
        }
        removed
    }

    pub async fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
