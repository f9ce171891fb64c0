//! Session store keyed by visitor id

use async_trait::async_trait;
use dashmap::DashMap;
use inmo_agent_core::Session;

use crate::PersistenceError;

/// Session store trait
///
/// `get` of an unknown visitor yields a fresh default session without storing
/// it; only `set` persists. Writes for one key are last-writer-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, visitor_id: &str) -> Result<Session, PersistenceError>;

    async fn set(&self, visitor_id: &str, session: Session) -> Result<(), PersistenceError>;

    /// Remove the entry entirely
    async fn reset(&self, visitor_id: &str) -> Result<(), PersistenceError>;

    /// Number of stored sessions
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local session store
///
/// Does not survive restarts and is not shared across instances.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, visitor_id: &str) -> Result<Session, PersistenceError> {
        Ok(self
            .sessions
            .get(visitor_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn set(&self, visitor_id: &str, session: Session) -> Result<(), PersistenceError> {
        self.sessions.insert(visitor_id.to_string(), session);
        Ok(())
    }

    async fn reset(&self, visitor_id: &str) -> Result<(), PersistenceError> {
        if self.sessions.remove(visitor_id).is_some() {
            tracing::debug!(visitor_id = %visitor_id, "Session removed");
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}
