//! Error types for the raq workspace

use thiserror::Error;

/// Errors shared across the raq crates.
///
/// Configuration errors are fatal and surface before any document or query
/// is processed. Every other variant describes a collaborator failure that
/// the calling component recovers from locally (classifier fallback,
/// sub-query drop, degraded answer).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("Search backend error: {0}")]
    Search(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
