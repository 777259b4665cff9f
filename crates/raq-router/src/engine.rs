//! Primary-with-fallback classification engine

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use raq_core::{
    Classification, ClassificationMethod, ClassifierProvider, Error, QueryType, RawClassification,
    SearchStrategy,
};

use crate::fallback::classify_fallback;

/// Decision rubric handed to the external classifier.
///
/// Ends with the JSON schema the response must follow; the engine appends
/// nothing — providers are expected to attach the user query themselves.
pub const DECISION_RUBRIC: &str = r#"You are a query router for a hybrid retrieval system. Decide which backend should handle the user's query.

ROUTE TO "vector" if:
- The query asks "what is", "how does", "explain", "describe", "tell me about"
- The query seeks detailed explanations, definitions, or comprehensive information
- The query asks for examples, use cases, analysis, or in-depth descriptions

ROUTE TO "knowledge_graph" if:
- The query asks "who is", "who owns", "who leads", "who founded"
- The query asks about relationships: "connected to", "invests in", "partners with", "competes with"
- The query seeks entity-to-entity relationships, organizational structure, investments, or acquisitions

ROUTE TO "hybrid" if:
- The query combines relationship questions with requests for detailed explanation
- The query needs both "who/what is connected" and comprehensive content

ROUTE TO "general" if:
- The query is purely conversational, a greeting, or casual small talk
- The query requests no factual, technical, or analytical information

IMPORTANT: if the query asks for ANY factual information, do not route it to "general".

Respond with JSON only, using exactly this structure:
{
    "search_strategy": "vector" | "knowledge_graph" | "hybrid" | "general",
    "confidence": 0.0-1.0,
    "reasoning": "why this routing decision was made",
    "query_type": "relationship" | "factual" | "explanatory" | "comparative" | "analytical" | "general_conversation",
    "entities_mentioned": ["entities named in the query"],
    "requires_multi_hop": true | false
}"#;

/// Classifies queries through an external provider, falling back to
/// deterministic keyword scoring on any failure.
///
/// `classify` is total: every failure mode of the provider terminates in the
/// fallback, tagged with its cause.
pub struct ClassificationEngine<C: ClassifierProvider> {
    provider: Arc<C>,
}

impl<C: ClassifierProvider> ClassificationEngine<C> {
    pub fn new(provider: Arc<C>) -> Self {
        Self { provider }
    }

    /// Classify a query. Never fails outward.
    pub async fn classify(&self, query: &str) -> Classification {
        match self.provider.classify_raw(query, DECISION_RUBRIC).await {
            Ok(raw) => match Self::validate(raw) {
                Ok(classification) => {
                    debug!(strategy = %classification.strategy, "primary classification succeeded");
                    classification
                }
                Err(reason) => {
                    warn!(%reason, "primary classifier returned an unusable result; using keyword fallback");
                    classify_fallback(query, ClassificationMethod::FallbackParseError)
                }
            },
            Err(Error::Serialization(reason)) => {
                warn!(%reason, "primary classifier output could not be parsed; using keyword fallback");
                classify_fallback(query, ClassificationMethod::FallbackParseError)
            }
            Err(error) => {
                warn!(%error, "primary classifier call failed; using keyword fallback");
                classify_fallback(query, ClassificationMethod::FallbackPrimaryError)
            }
        }
    }

    /// Turn a raw provider result into a classification, rejecting anything
    /// without a recognizable strategy
    fn validate(raw: RawClassification) -> Result<Classification, String> {
        let strategy = SearchStrategy::from_str(&raw.search_strategy)
            .ok_or_else(|| format!("unknown search strategy '{}'", raw.search_strategy))?;
        let query_type = QueryType::from_str(&raw.query_type)
            .unwrap_or_else(|| QueryType::for_strategy(strategy));

        Ok(Classification {
            strategy,
            confidence: raw.confidence.clamp(0.0, 1.0),
            reasoning: raw.reasoning,
            query_type,
            entities_mentioned: raw.entities_mentioned,
            requires_multi_hop: raw.requires_multi_hop,
            method: ClassificationMethod::Primary,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    enum Script {
        Ok(RawClassification),
        Fail(fn() -> Error),
    }

    struct ScriptedClassifier {
        script: Script,
    }

    #[async_trait]
    impl ClassifierProvider for ScriptedClassifier {
        async fn classify_raw(
            &self,
            _query: &str,
            rubric: &str,
        ) -> raq_core::Result<RawClassification> {
            assert!(rubric.contains("search_strategy"));
            match &self.script {
                Script::Ok(raw) => Ok(raw.clone()),
                Script::Fail(make) => Err(make()),
            }
        }
    }

    fn engine(script: Script) -> ClassificationEngine<ScriptedClassifier> {
        ClassificationEngine::new(Arc::new(ScriptedClassifier { script }))
    }

    fn raw(strategy: &str) -> RawClassification {
        RawClassification {
            search_strategy: strategy.to_string(),
            confidence: 0.85,
            reasoning: "scripted".to_string(),
            query_type: "explanatory".to_string(),
            entities_mentioned: vec!["Acme".to_string()],
            requires_multi_hop: false,
        }
    }

    #[tokio::test]
    async fn test_valid_primary_result_passes_through() {
        let engine = engine(Script::Ok(raw("vector")));
        let result = engine.classify("what is machine learning").await;
        assert_eq!(result.method, ClassificationMethod::Primary);
        assert_eq!(result.strategy, SearchStrategy::Vector);
        assert_eq!(result.confidence, 0.85);
        assert_eq!(result.entities_mentioned, vec!["Acme".to_string()]);
    }

    #[tokio::test]
    async fn test_confidence_is_clamped() {
        let mut over = raw("hybrid");
        over.confidence = 3.0;
        let engine = engine(Script::Ok(over));
        let result = engine.classify("anything").await;
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_unknown_strategy_falls_back_as_parse_error() {
        let engine = engine(Script::Ok(raw("telepathy")));
        let result = engine.classify("what is machine learning").await;
        assert_eq!(result.method, ClassificationMethod::FallbackParseError);
        // the fallback, not the provider, decided the strategy
        assert_eq!(result.strategy, SearchStrategy::Vector);
    }

    #[tokio::test]
    async fn test_serialization_error_falls_back_as_parse_error() {
        let engine = engine(Script::Fail(|| Error::Serialization("bad json".to_string())));
        let result = engine.classify("hi").await;
        assert_eq!(result.method, ClassificationMethod::FallbackParseError);
        assert_eq!(result.strategy, SearchStrategy::General);
        assert_eq!(result.confidence, 0.9);
    }

    #[tokio::test]
    async fn test_service_errors_fall_back_as_primary_error() {
        for make in [
            (|| Error::Network("unreachable".to_string())) as fn() -> Error,
            || Error::Timeout("too slow".to_string()),
            || Error::Provider("500".to_string()),
        ] {
            let engine = engine(Script::Fail(make));
            let result = engine.classify("who owns OpenAI and explain their strategy").await;
            assert_eq!(result.method, ClassificationMethod::FallbackPrimaryError);
            assert_eq!(result.strategy, SearchStrategy::Hybrid);
        }
    }

    #[tokio::test]
    async fn test_unknown_query_type_defaults_by_strategy() {
        let mut odd = raw("knowledge_graph");
        odd.query_type = "interpretive dance".to_string();
        let engine = engine(Script::Ok(odd));
        let result = engine.classify("who leads Acme").await;
        assert_eq!(result.query_type, QueryType::Relationship);
    }
}
