//! Query expansion collaborator trait

use async_trait::async_trait;

use crate::Result;

/// Trait for query expanders that produce paraphrased variants of a query.
///
/// Implementations return paraphrases only — callers prepend the original
/// query when building a retrieval fan-out, and fall back to the original
/// query alone when expansion fails.
#[async_trait]
pub trait QueryExpander: Send + Sync {
    /// Produce semantically equivalent rewordings of `query`
    async fn expand(&self, query: &str) -> Result<Vec<String>>;
}
