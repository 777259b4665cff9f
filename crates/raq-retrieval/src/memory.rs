//! In-memory search backend
//!
//! A word-overlap scorer over a RwLock'd map. Good enough for tests and
//! demos; production deployments plug a real vector or hybrid engine into
//! the same trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use raq_core::{Error, Result, SearchDocument, SearchProvider};

/// Local in-memory search provider
pub struct InMemorySearchProvider {
    documents: RwLock<HashMap<String, SearchDocument>>,
}

impl InMemorySearchProvider {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Fraction of query words contained in the document body
    fn relevance(query: &str, content: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let content_lower = content.to_lowercase();

        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        if query_words.is_empty() {
            return 0.0;
        }

        let matches = query_words
            .iter()
            .filter(|word| content_lower.contains(*word))
            .count();
        matches as f32 / query_words.len() as f32
    }
}

impl Default for InMemorySearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for InMemorySearchProvider {
    async fn index(&self, documents: Vec<SearchDocument>) -> Result<()> {
        let mut docs = self
            .documents
            .write()
            .map_err(|e| Error::Search(format!("lock error: {e}")))?;
        for document in documents {
            docs.insert(document.id.clone(), document);
        }
        Ok(())
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchDocument>> {
        let docs = self
            .documents
            .read()
            .map_err(|e| Error::Search(format!("lock error: {e}")))?;

        let mut results: Vec<SearchDocument> = docs
            .values()
            .map(|doc| {
                let mut scored = doc.clone();
                scored.score = Some(Self::relevance(query, &doc.content));
                scored
            })
            .filter(|doc| doc.score.unwrap_or(0.0) > 0.0)
            .collect();

        // score-descending, id tiebreak so equal scores order deterministically
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(k);

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let docs = self
            .documents
            .read()
            .map_err(|e| Error::Search(format!("lock error: {e}")))?;
        Ok(docs.len())
    }
}
