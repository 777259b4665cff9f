//! Deterministic keyword fallback classifier
//!
//! Used whenever the primary classifier fails or returns something
//! unparseable. Total over every input string, including the empty one.

use chrono::Utc;

use raq_core::{Classification, ClassificationMethod, QueryType, SearchStrategy};

/// Greetings and small talk
const GENERAL_KEYWORDS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good evening",
    "good night",
    "how are you",
    "how r u",
    "what's up",
    "whats up",
    "can you help me",
    "could you help me",
    "hiya",
    "yo",
    "sup",
    "nice to meet you",
    "thank you",
    "thanks",
    "howdy",
    "morning",
    "evening",
];

/// Entity-connection language
const RELATIONSHIP_KEYWORDS: &[&str] = &[
    "who is",
    "connected to",
    "relationship",
    "invests",
    "owns",
    "competes",
    "partnership",
    "acquisition",
    "merger",
    "ceo",
    "founder",
    "leads",
    "collaborates",
    "works with",
    "partnered",
    "funded by",
    "backed by",
];

/// Explanatory language
const DETAIL_KEYWORDS: &[&str] = &[
    "what is",
    "how does",
    "explain",
    "describe",
    "tell me about",
    "analysis",
    "history",
    "overview",
    "definition",
    "examples",
    "use cases",
];

/// Count distinct keywords that occur anywhere in the query
fn keyword_score(query_lower: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| query_lower.contains(*kw)).count()
}

/// Classify a query from keyword scores alone.
///
/// Precedence is strict and deliberate: greeting detection wins outright so
/// small talk never reaches a retrieval backend; between the two content
/// strategies the higher keyword count wins; a genuine tie (including zero
/// hits everywhere) routes to hybrid, which queries both backends.
pub fn classify_fallback(query: &str, method: ClassificationMethod) -> Classification {
    let query_lower = query.to_lowercase();

    let general_score = keyword_score(&query_lower, GENERAL_KEYWORDS);
    let relationship_score = keyword_score(&query_lower, RELATIONSHIP_KEYWORDS);
    let detail_score = keyword_score(&query_lower, DETAIL_KEYWORDS);

    let (strategy, confidence, query_type) =
        if general_score > relationship_score && general_score > detail_score {
            (SearchStrategy::General, 0.9, QueryType::GeneralConversation)
        } else if relationship_score > detail_score {
            (SearchStrategy::KnowledgeGraph, 0.7, QueryType::Relationship)
        } else if detail_score > relationship_score {
            (SearchStrategy::Vector, 0.7, QueryType::Explanatory)
        } else {
            (SearchStrategy::Hybrid, 0.7, QueryType::Mixed)
        };

    let requires_multi_hop =
        query_lower.contains("relationship") || query_lower.contains("connected");

    Classification {
        strategy,
        confidence,
        reasoning: format!(
            "Keyword fallback classification. Scores: general={general_score}, \
             relationship={relationship_score}, detail={detail_score}"
        ),
        query_type,
        entities_mentioned: Vec::new(),
        requires_multi_hop,
        method,
        timestamp: Utc::now(),
    }
}
