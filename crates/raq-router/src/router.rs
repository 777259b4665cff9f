//! Top-level query router
//!
//! Classifies a query, runs fused retrieval for the content strategies,
//! hands the assembled context to the answer generator, and records the
//! exchange in the session store. Collaborator failures degrade the answer;
//! they never fail the route.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use raq_core::{
    AnswerGenerator, Classification, ClassificationMethod, ClassifierProvider, Exchange,
    QueryExpander, SearchProvider, SearchStrategy, SessionStore,
};
use raq_retrieval::{FusedResult, FusionRetriever};

use crate::engine::ClassificationEngine;

const GENERAL_DEGRADED_REPLY: &str = "I'm here to help! What would you like to know?";
const RETRIEVAL_DEGRADED_REPLY: &str =
    "I ran into a problem while putting an answer together. Please try again.";

/// Everything the transport layer needs to render one routed answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedResponse {
    pub query: String,
    pub strategy: SearchStrategy,
    pub confidence: f32,
    pub method: ClassificationMethod,
    pub answer: String,
    pub documents: Vec<FusedResult>,
    /// True when every retrieval sub-query failed, as opposed to the
    /// backend genuinely matching nothing
    pub retrieval_exhausted: bool,
    pub timestamp: DateTime<Utc>,
}

/// Orchestrates classify → retrieve → generate for one query at a time
pub struct QueryRouter<C, X, S, G, T>
where
    C: ClassifierProvider,
    X: QueryExpander,
    S: SearchProvider,
    G: AnswerGenerator,
    T: SessionStore,
{
    engine: ClassificationEngine<C>,
    retriever: FusionRetriever<S, X>,
    generator: Arc<G>,
    sessions: Arc<T>,
}

impl<C, X, S, G, T> QueryRouter<C, X, S, G, T>
where
    C: ClassifierProvider,
    X: QueryExpander,
    S: SearchProvider,
    G: AnswerGenerator,
    T: SessionStore,
{
    pub fn new(
        engine: ClassificationEngine<C>,
        retriever: FusionRetriever<S, X>,
        generator: Arc<G>,
        sessions: Arc<T>,
    ) -> Self {
        Self {
            engine,
            retriever,
            generator,
            sessions,
        }
    }

    /// Route one query and record the exchange under `session_id`
    pub async fn route(&self, session_id: &str, query: &str) -> RoutedResponse {
        let classification = self.engine.classify(query).await;
        debug!(
            strategy = %classification.strategy,
            confidence = classification.confidence,
            method = ?classification.method,
            "query classified"
        );

        let response = match classification.strategy {
            SearchStrategy::General => self.answer_general(query, &classification).await,
            strategy => self.answer_with_retrieval(strategy, query, &classification).await,
        };

        let exchange = Exchange {
            query: query.to_string(),
            strategy: response.strategy,
            answer: response.answer.clone(),
            timestamp: response.timestamp,
        };
        if let Err(error) = self.sessions.append(session_id, exchange).await {
            warn!(%error, session_id, "failed to record the exchange");
        }

        response
    }

    async fn answer_general(&self, query: &str, classification: &Classification) -> RoutedResponse {
        let answer = match self
            .generator
            .answer(SearchStrategy::General, query, "")
            .await
        {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "answer generation failed for a conversational query");
                GENERAL_DEGRADED_REPLY.to_string()
            }
        };

        self.response(query, classification, answer, Vec::new(), false)
    }

    async fn answer_with_retrieval(
        &self,
        strategy: SearchStrategy,
        query: &str,
        classification: &Classification,
    ) -> RoutedResponse {
        let retrieval = self.retriever.retrieve(query).await;
        let exhausted = retrieval.is_exhausted();
        if exhausted {
            warn!("every retrieval sub-query failed; generating without context");
        }

        let context = build_context(&retrieval.results);
        let answer = match self.generator.answer(strategy, query, &context).await {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "answer generation failed");
                RETRIEVAL_DEGRADED_REPLY.to_string()
            }
        };

        self.response(query, classification, answer, retrieval.results, exhausted)
    }

    fn response(
        &self,
        query: &str,
        classification: &Classification,
        answer: String,
        documents: Vec<FusedResult>,
        retrieval_exhausted: bool,
    ) -> RoutedResponse {
        RoutedResponse {
            query: query.to_string(),
            strategy: classification.strategy,
            confidence: classification.confidence,
            method: classification.method,
            answer,
            documents,
            retrieval_exhausted,
            timestamp: Utc::now(),
        }
    }
}

/// Number the retrieved excerpts and label each with its source
fn build_context(results: &[FusedResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut context = String::from("Relevant document excerpts:\n\n");
    for (i, result) in results.iter().enumerate() {
        context.push_str(&format!(
            "{}. [{}] {}\n\n",
            i + 1,
            result.document.source,
            result.document.content
        ));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    use raq_core::{Error, RawClassification, Result, SearchDocument};
    use raq_retrieval::RetrievalConfig;

    use crate::session::InMemorySessionStore;

    struct StubClassifier {
        strategy: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl ClassifierProvider for StubClassifier {
        async fn classify_raw(&self, _query: &str, _rubric: &str) -> Result<RawClassification> {
            if self.fail {
                return Err(Error::Network("classifier offline".to_string()));
            }
            Ok(RawClassification {
                search_strategy: self.strategy.to_string(),
                confidence: 0.8,
                reasoning: "stubbed".to_string(),
                query_type: String::new(),
                entities_mentioned: vec![],
                requires_multi_hop: false,
            })
        }
    }

    struct NoExpansion;

    #[async_trait]
    impl QueryExpander for NoExpansion {
        async fn expand(&self, _query: &str) -> Result<Vec<String>> {
            Ok(vec![])
        }
    }

    struct StubSearch {
        fail: bool,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn index(&self, _documents: Vec<SearchDocument>) -> Result<()> {
            Ok(())
        }

        async fn search(&self, query: &str, _k: usize) -> Result<Vec<SearchDocument>> {
            if self.fail {
                return Err(Error::Search("backend down".to_string()));
            }
            Ok(vec![SearchDocument {
                id: "hit:0".to_string(),
                source: "corpus".to_string(),
                content: format!("passage matching '{query}'"),
                metadata: json!({}),
                score: Some(0.9),
            }])
        }

        async fn count(&self) -> Result<usize> {
            Ok(1)
        }
    }

    /// Records the context each call received; errors on demand
    struct RecordingGenerator {
        contexts: Mutex<Vec<(SearchStrategy, String)>>,
        fail: bool,
    }

    impl RecordingGenerator {
        fn new(fail: bool) -> Self {
            Self {
                contexts: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl AnswerGenerator for RecordingGenerator {
        async fn answer(
            &self,
            strategy: SearchStrategy,
            _query: &str,
            context: &str,
        ) -> Result<String> {
            self.contexts
                .lock()
                .unwrap()
                .push((strategy, context.to_string()));
            if self.fail {
                return Err(Error::Provider("generation failed".to_string()));
            }
            Ok("generated answer".to_string())
        }
    }

    #[allow(clippy::type_complexity)]
    fn router(
        strategy: &'static str,
        classifier_fails: bool,
        search_fails: bool,
        generator_fails: bool,
    ) -> (
        QueryRouter<StubClassifier, NoExpansion, StubSearch, RecordingGenerator, InMemorySessionStore>,
        Arc<RecordingGenerator>,
        Arc<InMemorySessionStore>,
    ) {
        let engine = ClassificationEngine::new(Arc::new(StubClassifier {
            strategy,
            fail: classifier_fails,
        }));
        let retriever = FusionRetriever::new(
            Arc::new(StubSearch { fail: search_fails }),
            Arc::new(NoExpansion),
            RetrievalConfig::default(),
        )
        .unwrap();
        let generator = Arc::new(RecordingGenerator::new(generator_fails));
        let sessions = Arc::new(InMemorySessionStore::new());
        let router = QueryRouter::new(engine, retriever, generator.clone(), sessions.clone());
        (router, generator, sessions)
    }

    #[tokio::test]
    async fn test_general_query_skips_retrieval() {
        let (router, generator, _) = router("general", false, false, false);
        let response = router.route("s1", "hello there").await;

        assert_eq!(response.strategy, SearchStrategy::General);
        assert!(response.documents.is_empty());
        let calls = generator.contexts.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, SearchStrategy::General);
        assert!(calls[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_vector_query_passes_context_to_generator() {
        let (router, generator, _) = router("vector", false, false, false);
        let response = router.route("s1", "what is rust").await;

        assert_eq!(response.strategy, SearchStrategy::Vector);
        assert_eq!(response.answer, "generated answer");
        assert!(!response.documents.is_empty());
        assert!(!response.retrieval_exhausted);

        let calls = generator.contexts.lock().unwrap();
        assert!(calls[0].1.contains("[corpus]"));
        assert!(calls[0].1.contains("what is rust"));
    }

    #[tokio::test]
    async fn test_search_failure_flags_exhaustion_but_still_answers() {
        let (router, _, _) = router("hybrid", false, true, false);
        let response = router.route("s1", "broken backend").await;

        assert!(response.retrieval_exhausted);
        assert!(response.documents.is_empty());
        assert_eq!(response.answer, "generated answer");
    }

    #[tokio::test]
    async fn test_generator_failure_degrades_answer() {
        {
            let (router, _, _) = router("vector", false, false, true);
            let response = router.route("s1", "anything").await;
            assert_eq!(response.answer, RETRIEVAL_DEGRADED_REPLY);
        }

        let (router, _, _) = router("general", false, false, true);
        let response = router.route("s1", "hello").await;
        assert_eq!(response.answer, GENERAL_DEGRADED_REPLY);
    }

    #[tokio::test]
    async fn test_classifier_failure_routes_via_fallback() {
        let (router, _, _) = router("vector", true, false, false);
        let response = router.route("s1", "hi").await;

        assert_eq!(response.method, ClassificationMethod::FallbackPrimaryError);
        assert_eq!(response.strategy, SearchStrategy::General);
    }

    #[tokio::test]
    async fn test_exchanges_are_recorded_per_session() {
        let (router, _, sessions) = router("vector", false, false, false);
        router.route("alpha", "first question").await;
        router.route("alpha", "second question").await;
        router.route("beta", "other session").await;

        let history = sessions.history("alpha").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].query, "first question");
        assert_eq!(history[1].query, "second question");
        assert_eq!(sessions.history("beta").await.unwrap().len(), 1);
        assert!(sessions.history("missing").await.unwrap().is_empty());
    }

    #[test]
    fn test_build_context_numbers_and_labels() {
        let results = vec![
            FusedResult {
                document: SearchDocument {
                    id: "a".to_string(),
                    source: "guide".to_string(),
                    content: "first excerpt".to_string(),
                    metadata: json!({}),
                    score: None,
                },
                score: 0.03,
                rank: 0,
            },
            FusedResult {
                document: SearchDocument {
                    id: "b".to_string(),
                    source: "manual".to_string(),
                    content: "second excerpt".to_string(),
                    metadata: json!({}),
                    score: None,
                },
                score: 0.02,
                rank: 1,
            },
        ];
        let context = build_context(&results);
        assert!(context.contains("1. [guide] first excerpt"));
        assert!(context.contains("2. [manual] second excerpt"));
        assert!(build_context(&[]).is_empty());
    }
}
