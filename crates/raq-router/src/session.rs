//! In-memory session store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use raq_core::{Error, Exchange, Result, SessionStore};

/// Session history held in process memory.
///
/// Suitable for a single-process deployment; anything that must survive a
/// restart implements `SessionStore` against a real database instead.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<Exchange>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn append(&self, session_id: &str, exchange: Exchange) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| Error::Session(format!("lock error: {e}")))?;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .push(exchange);
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<Exchange>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| Error::Session(format!("lock error: {e}")))?;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn clear(&self, session_id: &str) -> Result<bool> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| Error::Session(format!("lock error: {e}")))?;
        Ok(sessions.remove(session_id).is_some())
    }
}
