//! Reciprocal rank fusion
//!
//! Merges the ranked lists produced by a multi-query fan-out into a single
//! relevance-ordered list. A document's fused score is the sum of
//! `1 / (rank + k)` over every list it appears in (0-based ranks), keyed by
//! the document's value identity, so the fold is commutative across lists.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use raq_core::{DocumentKey, SearchDocument};

/// A document with its accumulated fusion score and final rank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedResult {
    pub document: SearchDocument,
    pub score: f32,
    pub rank: usize,
}

/// Fold ranked lists into one list ordered by fused score.
///
/// Exact score ties resolve to first-seen order across the fold: the
/// accumulator preserves insertion order and the final sort is stable, so
/// the output is deterministic for identical inputs. `fusion_k` dampens the
/// influence of low ranks; larger values flatten the score distribution.
pub fn reciprocal_rank_fusion(lists: &[Vec<SearchDocument>], fusion_k: f32) -> Vec<FusedResult> {
    let mut index: HashMap<DocumentKey, usize> = HashMap::new();
    let mut fused: Vec<FusedResult> = Vec::new();

    for list in lists {
        for (rank, document) in list.iter().enumerate() {
            let contribution = 1.0 / (rank as f32 + fusion_k);
            let key = document.identity();
            if let Some(&slot) = index.get(&key) {
                fused[slot].score += contribution;
            } else {
                index.insert(key, fused.len());
                fused.push(FusedResult {
                    document: document.clone(),
                    score: contribution,
                    rank: 0,
                });
            }
        }
    }

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (position, result) in fused.iter_mut().enumerate() {
        result.rank = position;
    }

    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(source: &str, content: &str) -> SearchDocument {
        SearchDocument {
            id: format!("{source}:{content}"),
            source: source.to_string(),
            content: content.to_string(),
            metadata: json!({}),
            score: None,
        }
    }

    #[test]
    fn test_symmetric_ranks_tie_and_keep_first_seen_order() {
        let doc1 = doc("a", "first document");
        let doc2 = doc("a", "second document");
        let list1 = vec![doc1.clone(), doc2.clone()];
        let list2 = vec![doc2.clone(), doc1.clone()];

        let fused = reciprocal_rank_fusion(&[list1, list2], 60.0);

        assert_eq!(fused.len(), 2);
        // doc1: 1/60 + 1/61, doc2: 1/61 + 1/60 — an exact tie, so the
        // first-seen document wins.
        assert!((fused[0].score - fused[1].score).abs() < f32::EPSILON);
        assert_eq!(fused[0].document.content, "first document");
        assert_eq!(fused[0].rank, 0);
        assert_eq!(fused[1].rank, 1);
    }

    #[test]
    fn test_fold_order_is_commutative() {
        let a = vec![doc("x", "alpha"), doc("x", "beta"), doc("x", "gamma")];
        let b = vec![doc("x", "gamma"), doc("x", "delta")];

        let forward = reciprocal_rank_fusion(&[a.clone(), b.clone()], 60.0);
        let reverse = reciprocal_rank_fusion(&[b, a], 60.0);

        let score_of = |results: &[FusedResult], content: &str| {
            results
                .iter()
                .find(|r| r.document.content == content)
                .map(|r| r.score)
                .unwrap()
        };
        for content in ["alpha", "beta", "gamma", "delta"] {
            assert_eq!(score_of(&forward, content), score_of(&reverse, content));
        }
        // gamma appears in both lists and must outrank single-list entries
        assert_eq!(forward[0].document.content, "gamma");
        assert_eq!(reverse[0].document.content, "gamma");
    }

    #[test]
    fn test_duplicate_content_across_queries_merges() {
        let same = doc("report", "shared passage");
        let list1 = vec![same.clone(), doc("report", "only in one")];
        let list2 = vec![same.clone()];

        let fused = reciprocal_rank_fusion(&[list1, list2], 60.0);

        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].document.content, "shared passage");
        let expected = 1.0 / 60.0 + 1.0 / 60.0;
        assert!((fused[0].score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_same_content_different_sources_stays_distinct() {
        let list = vec![doc("report_a", "identical text"), doc("report_b", "identical text")];
        let fused = reciprocal_rank_fusion(&[list], 60.0);
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn test_empty_lists_are_neutral() {
        let list = vec![doc("x", "alpha")];
        let fused = reciprocal_rank_fusion(&[Vec::new(), list, Vec::new()], 60.0);
        assert_eq!(fused.len(), 1);
        assert!((fused[0].score - 1.0 / 60.0).abs() < 1e-6);

        assert!(reciprocal_rank_fusion(&[], 60.0).is_empty());
    }

    #[test]
    fn test_fusion_k_flattens_scores() {
        let list = vec![doc("x", "top"), doc("x", "bottom")];
        let sharp = reciprocal_rank_fusion(&[list.clone()], 1.0);
        let flat = reciprocal_rank_fusion(&[list], 100.0);

        let gap = |results: &[FusedResult]| results[0].score - results[1].score;
        assert!(gap(&sharp) > gap(&flat));
    }

    #[test]
    fn test_single_list_preserves_order() {
        let list = vec![doc("x", "one"), doc("x", "two"), doc("x", "three")];
        let fused = reciprocal_rank_fusion(&[list], 60.0);
        let contents: Vec<&str> = fused.iter().map(|r| r.document.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }
}
