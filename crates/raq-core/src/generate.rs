//! Answer generation collaborator trait

use async_trait::async_trait;

use crate::{Result, SearchStrategy};

/// Trait for the answer-generation step that follows routing.
///
/// The router hands over the chosen strategy, the user query, and the
/// assembled retrieval context (empty for conversational queries); how the
/// answer is produced is entirely the implementation's concern.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer for `query` under the given strategy
    async fn answer(&self, strategy: SearchStrategy, query: &str, context: &str) -> Result<String>;
}
