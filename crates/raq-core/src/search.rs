//! Search collaborator trait and document types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A document as stored in and returned by a search backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDocument {
    pub id: String,
    /// Label of the originating document (file stem or external id)
    pub source: String,
    pub content: String,
    pub metadata: serde_json::Value,
    /// Backend-specific relevance score, higher is better
    pub score: Option<f32>,
}

impl SearchDocument {
    /// Value identity used to merge results across ranked lists
    pub fn identity(&self) -> DocumentKey {
        DocumentKey::derive(&self.content, &self.source)
    }
}

/// Exact-match identity for rank fusion.
///
/// Two documents fuse iff their keys are equal: the md5 digest of the
/// whitespace-normalized content, a NUL separator, and the source label.
/// Identical text from different sources stays distinct; re-retrieved copies
/// of the same chunk merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn derive(content: &str, source: &str) -> Self {
        let normalized = content.split_whitespace().collect::<Vec<_>>().join(" ");
        let digest = md5::compute(format!("{normalized}\0{source}"));
        DocumentKey(format!("{digest:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trait for search backends (vector index, hybrid engine, etc.)
///
/// The backend owns embedding and ranking internally; callers only see
/// ranked documents. `search` is best-effort: it may return fewer than `k`
/// results and may fail per call.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Store a batch of documents
    async fn index(&self, documents: Vec<SearchDocument>) -> Result<()>;

    /// Return up to `k` documents ranked by relevance, best first
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchDocument>>;

    /// Get the total number of stored documents
    async fn count(&self) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(source: &str, content: &str) -> SearchDocument {
        SearchDocument {
            id: format!("{source}:0"),
            source: source.to_string(),
            content: content.to_string(),
            metadata: json!({}),
            score: None,
        }
    }

    #[test]
    fn test_identity_ignores_whitespace_runs() {
        let a = DocumentKey::derive("alpha  beta\n gamma", "notes");
        let b = DocumentKey::derive("alpha beta gamma", "notes");
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_distinguishes_sources() {
        let a = DocumentKey::derive("same text", "report_a");
        let b = DocumentKey::derive("same text", "report_b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_identity_stable_across_clones() {
        let original = doc("guide", "chunk body");
        let copy = SearchDocument {
            score: Some(0.4),
            id: "other-id".to_string(),
            ..original.clone()
        };
        // ids and scores differ between retrievals of the same chunk
        assert_eq!(original.identity(), copy.identity());
    }
}
