//! Gemini collaborator client for raq
//!
//! One HTTP client implementing the three LLM-facing traits: query
//! classification, query expansion, and answer generation.

mod client;
mod config;


pub use client::GeminiClient;
pub use config::GeminiConfig;

// Re-export core types for convenience
pub use raq_core::{
    AnswerGenerator, ClassifierProvider, Error, QueryExpander, RawClassification, Result,
    SearchStrategy,
};
