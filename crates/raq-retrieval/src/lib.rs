//! Retrieval pipeline for raq
//!
//! This crate provides the text-windowing chunker, the reciprocal-rank-fusion
//! merge, the multi-query fusion retriever, and a chunk indexer, plus an
//! in-memory search backend for tests and demos.

pub mod chunker;
pub mod fusion;
pub mod indexer;
pub mod memory;
pub mod retriever;

pub use chunker::{Chunk, ChunkerConfig, Split, SplitMode, WindowChunker};
pub use fusion::{FusedResult, reciprocal_rank_fusion};
pub use indexer::{ChunkIndexer, IndexSummary};
pub use memory::InMemorySearchProvider;
pub use retriever::{FusionRetriever, Retrieval, RetrievalConfig};

// Re-export core types for convenience
pub use raq_core::{DocumentKey, Error, Result, SearchDocument, SearchProvider};
