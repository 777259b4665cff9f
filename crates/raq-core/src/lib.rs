//! Core traits and types for raq (Retrieval-Augmented Querying)
//!
//! This crate defines the fundamental traits and types used across the raq
//! workspace. It provides capability-facing interfaces for query
//! classification, search backends, query expansion, answer generation, and
//! session persistence, making the system test-friendly and extensible.

pub mod classify;
pub mod error;
pub mod expand;
pub mod generate;
pub mod search;
pub mod session;
pub mod tokens;

pub use classify::{
    Classification, ClassificationMethod, ClassifierProvider, QueryType, RawClassification,
    SearchStrategy,
};
pub use error::{Error, Result};
pub use expand::QueryExpander;
pub use generate::AnswerGenerator;
pub use search::{DocumentKey, SearchDocument, SearchProvider};
pub use session::{Exchange, SessionStore};
pub use tokens::{TokenCounter, WhitespaceTokenCounter};
