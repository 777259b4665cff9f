//! Session persistence collaborator trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, SearchStrategy};

/// One completed query/answer exchange within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub query: String,
    pub strategy: SearchStrategy,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

/// Trait for session history stores.
///
/// Request identity is explicit: callers pass the session id with every
/// operation, and the store is injected where it is needed rather than held
/// as process-global state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Append an exchange to a session, creating the session if absent
    async fn append(&self, session_id: &str, exchange: Exchange) -> Result<()>;

    /// Return a session's history in append order; empty if the session is unknown
    async fn history(&self, session_id: &str) -> Result<Vec<Exchange>>;

    /// Drop a session; returns whether it existed
    async fn clear(&self, session_id: &str) -> Result<bool>;
}
