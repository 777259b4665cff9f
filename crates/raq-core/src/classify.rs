//! Query classification types and the classifier collaborator trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Retrieval/response paths a query can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Semantic document search
    Vector,
    /// Entity-relationship search
    KnowledgeGraph,
    /// Combined vector and knowledge-graph search
    Hybrid,
    /// Conversational reply, no retrieval
    General,
}

impl SearchStrategy {
    /// Get the wire label for this strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::Vector => "vector",
            SearchStrategy::KnowledgeGraph => "knowledge_graph",
            SearchStrategy::Hybrid => "hybrid",
            SearchStrategy::General => "general",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<SearchStrategy> {
        match s.trim().to_lowercase().as_str() {
            "vector" => Some(SearchStrategy::Vector),
            "knowledge_graph" | "knowledge graph" | "graph" => Some(SearchStrategy::KnowledgeGraph),
            "hybrid" => Some(SearchStrategy::Hybrid),
            "general" => Some(SearchStrategy::General),
            _ => None,
        }
    }

    /// Whether this strategy issues retrieval queries before answering
    pub fn is_retrieval(&self) -> bool {
        !matches!(self, SearchStrategy::General)
    }

    /// Get all supported strategies
    pub fn all() -> Vec<SearchStrategy> {
        vec![
            SearchStrategy::Vector,
            SearchStrategy::KnowledgeGraph,
            SearchStrategy::Hybrid,
            SearchStrategy::General,
        ]
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse shape of the question being asked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Relationship,
    Factual,
    Explanatory,
    Comparative,
    Analytical,
    GeneralConversation,
    Mixed,
}

impl QueryType {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<QueryType> {
        match s.trim().to_lowercase().as_str() {
            "relationship" => Some(QueryType::Relationship),
            "factual" => Some(QueryType::Factual),
            "explanatory" => Some(QueryType::Explanatory),
            "comparative" => Some(QueryType::Comparative),
            "analytical" => Some(QueryType::Analytical),
            "general_conversation" => Some(QueryType::GeneralConversation),
            "mixed" => Some(QueryType::Mixed),
            _ => None,
        }
    }

    /// Default query type when the classifier did not report a usable one
    pub fn for_strategy(strategy: SearchStrategy) -> QueryType {
        match strategy {
            SearchStrategy::Vector => QueryType::Explanatory,
            SearchStrategy::KnowledgeGraph => QueryType::Relationship,
            SearchStrategy::Hybrid => QueryType::Mixed,
            SearchStrategy::General => QueryType::GeneralConversation,
        }
    }
}

/// How a classification was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    /// The external classifier returned a valid structured result
    Primary,
    /// The external classifier responded but its output could not be parsed
    FallbackParseError,
    /// The external classifier call itself failed (network, timeout, service)
    FallbackPrimaryError,
}

impl ClassificationMethod {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, ClassificationMethod::Primary)
    }
}

/// The routing decision for one query.
///
/// `method` is `Primary` only when the external classifier returned a
/// syntactically valid result; otherwise strategy, confidence, and reasoning
/// come from the deterministic keyword fallback. Created fresh per query and
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub strategy: SearchStrategy,
    pub confidence: f32,
    pub reasoning: String,
    pub query_type: QueryType,
    pub entities_mentioned: Vec<String>,
    pub requires_multi_hop: bool,
    pub method: ClassificationMethod,
    pub timestamp: DateTime<Utc>,
}

/// Raw structured output expected from the external classifier.
///
/// Field names match the JSON schema the decision rubric asks for; strategy
/// and query type arrive as free strings and are validated by the
/// classification engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawClassification {
    pub search_strategy: String,
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub query_type: String,
    #[serde(default)]
    pub entities_mentioned: Vec<String>,
    #[serde(default)]
    pub requires_multi_hop: bool,
}

/// Trait for external query classifiers (e.g. an LLM service)
///
/// Implementations must return `Error::Serialization` when the service
/// responded but the payload was not valid structured output; any other
/// error variant is treated as a service failure. Both are recovered by the
/// caller's deterministic fallback.
#[async_trait]
pub trait ClassifierProvider: Send + Sync {
    /// Classify a query against a fixed decision rubric
    async fn classify_raw(&self, query: &str, rubric: &str) -> Result<RawClassification>;
}
