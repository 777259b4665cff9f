//! Multi-query fusion retriever
//!
//! Expands a query into a fan-out of variants, issues every variant against
//! the search collaborator concurrently, and merges the ranked lists with
//! reciprocal rank fusion. Sub-query failures are dropped, never escalated.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use raq_core::{Error, QueryExpander, Result, SearchProvider};

use crate::fusion::{FusedResult, reciprocal_rank_fusion};

/// Tuning for fan-out retrieval
#[derive(Debug, Clone, Copy)]
pub struct RetrievalConfig {
    /// Maximum fused results returned to the caller
    pub top_k: usize,
    /// Results requested from each sub-query
    pub fan_k: usize,
    /// Rank-dampening constant for the fusion fold
    pub fusion_k: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            fan_k: 10,
            fusion_k: 60.0,
        }
    }
}

impl RetrievalConfig {
    fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Configuration("top_k must be greater than zero".to_string()));
        }
        if self.fan_k == 0 {
            return Err(Error::Configuration("fan_k must be greater than zero".to_string()));
        }
        if self.fusion_k <= 0.0 {
            return Err(Error::Configuration(format!(
                "fusion_k ({}) must be positive",
                self.fusion_k
            )));
        }
        Ok(())
    }
}

/// The outcome of one fused retrieval.
///
/// An empty result set with `is_exhausted()` true means every sub-query
/// failed; an empty set otherwise means the backend simply matched nothing.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub results: Vec<FusedResult>,
    pub queries_issued: usize,
    pub queries_failed: usize,
}

impl Retrieval {
    pub fn is_exhausted(&self) -> bool {
        self.queries_issued > 0 && self.queries_failed == self.queries_issued
    }
}

/// Fan-out retriever over a search backend and a query expander
pub struct FusionRetriever<S: SearchProvider, X: QueryExpander> {
    search: Arc<S>,
    expander: Arc<X>,
    config: RetrievalConfig,
}

impl<S: SearchProvider, X: QueryExpander> FusionRetriever<S, X> {
    pub fn new(search: Arc<S>, expander: Arc<X>, config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            search,
            expander,
            config,
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve and fuse results for `query`.
    ///
    /// The fan-out is the original query followed by the expander's
    /// paraphrases; expansion failure narrows the fan-out to the original
    /// query alone.
    pub async fn retrieve(&self, query: &str) -> Retrieval {
        let fanout = self.build_fanout(query).await;
        self.retrieve_fanout(&fanout).await
    }

    /// Issue an explicit fan-out of query variants and fuse the results.
    ///
    /// Callers are expected to put the original query first. Sub-queries run
    /// concurrently and are folded in fan-out order, so the fused ranking is
    /// deterministic regardless of completion order. Dropping the returned
    /// future cancels all in-flight sub-queries.
    pub async fn retrieve_fanout(&self, fanout: &[String]) -> Retrieval {
        debug!(variants = fanout.len(), "issuing retrieval fan-out");

        let searches = fanout.iter().map(|variant| self.search.search(variant, self.config.fan_k));
        let outcomes = join_all(searches).await;

        let mut lists = Vec::with_capacity(outcomes.len());
        let mut failed = 0usize;
        for (variant, outcome) in fanout.iter().zip(outcomes) {
            match outcome {
                Ok(list) => lists.push(list),
                Err(error) => {
                    failed += 1;
                    warn!(query = %variant, %error, "search sub-query failed; dropping it from fusion");
                }
            }
        }

        let mut results = reciprocal_rank_fusion(&lists, self.config.fusion_k);
        results.truncate(self.config.top_k);

        Retrieval {
            results,
            queries_issued: fanout.len(),
            queries_failed: failed,
        }
    }

    async fn build_fanout(&self, query: &str) -> Vec<String> {
        let mut fanout = vec![query.to_string()];
        match self.expander.expand(query).await {
            Ok(variants) => {
                fanout.extend(
                    variants
                        .into_iter()
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty() && v.as_str() != query),
                );
            }
            Err(error) => {
                warn!(%error, "query expansion failed; retrieving with the original query only");
            }
        }
        fanout
    }
}
