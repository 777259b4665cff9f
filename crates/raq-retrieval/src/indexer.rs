//! Chunk indexer
//!
//! Turns raw document text into chunks and hands them to the search
//! collaborator for storage. Parsing of rich formats (PDF, Markdown) happens
//! upstream; this indexer consumes plain text.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use raq_core::{Result, SearchDocument, SearchProvider, TokenCounter};

use crate::chunker::{SplitMode, WindowChunker};

/// Result of indexing one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSummary {
    pub chunks_indexed: usize,
    pub tokens_indexed: usize,
}

/// Chunks documents and stores them through a search provider
pub struct ChunkIndexer<C: TokenCounter, S: SearchProvider> {
    chunker: WindowChunker<C>,
    search: Arc<S>,
    mode: SplitMode,
}

impl<C: TokenCounter, S: SearchProvider> ChunkIndexer<C, S> {
    pub fn new(chunker: WindowChunker<C>, search: Arc<S>) -> Self {
        Self {
            chunker,
            search,
            mode: SplitMode::default(),
        }
    }

    /// Use a different split granularity
    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Chunk `text` and store every chunk under the `source` label.
    ///
    /// A document producing no chunks (empty or whitespace-only text) is a
    /// no-op, not an error.
    pub async fn index_text(&self, source: &str, text: &str) -> Result<IndexSummary> {
        let chunks = self.chunker.chunk_text(text, self.mode);
        if chunks.is_empty() {
            return Ok(IndexSummary {
                chunks_indexed: 0,
                tokens_indexed: 0,
            });
        }

        let total_chunks = chunks.len();
        let tokens_indexed = chunks.iter().map(|c| c.token_count).sum();
        let documents: Vec<SearchDocument> = chunks
            .into_iter()
            .enumerate()
            .map(|(chunk_index, chunk)| SearchDocument {
                id: format!("{source}:{chunk_index}"),
                source: source.to_string(),
                content: chunk.text(),
                metadata: json!({
                    "chunk_index": chunk_index,
                    "total_chunks": total_chunks,
                    "token_count": chunk.token_count,
                }),
                score: None,
            })
            .collect();

        self.search.index(documents).await?;
        info!(source, chunks = total_chunks, "indexed document");

        Ok(IndexSummary {
            chunks_indexed: total_chunks,
            tokens_indexed,
        })
    }
}
