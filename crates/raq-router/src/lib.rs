//! Strategy classification and query routing for raq
//!
//! This crate decides how a query should be answered: an LLM-backed primary
//! classification with a deterministic keyword fallback, and a router that
//! dispatches the query to the matching retrieval-and-generation path.

pub mod engine;
pub mod fallback;
pub mod router;
pub mod session;

pub use engine::{ClassificationEngine, DECISION_RUBRIC};
pub use fallback::classify_fallback;
pub use router::{QueryRouter, RoutedResponse};
pub use session::InMemorySessionStore;

// Re-export core types for convenience
pub use raq_core::{
    Classification, ClassificationMethod, ClassifierProvider, Error, QueryType, Result,
    SearchStrategy,
};
