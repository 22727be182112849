//! Threshold filtering, ordering and correctness bookkeeping.

use indexmap::IndexMap;

use crate::core::config::is_threshold_disabled;
use crate::core::model::{expressions_match, CandidateElement, DocumentedMethod, SemanticMatch, Tag};

use super::strategy::DistanceStrategy;

/// Turns raw (candidate, score) pairs into a [`SemanticMatch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchRanker;

impl MatchRanker {
    /// Create a ranker.
    pub fn new() -> Self {
        Self
    }

    /// Filter, order and classify `raw_scores` for one tag.
    ///
    /// Pairs scoring above `threshold` are dropped unless it is the disabled
    /// sentinel. Ties keep the order of `raw_scores`. Returns `None` when no
    /// candidate survives.
    #[allow(clippy::too_many_arguments)]
    pub fn rank(
        &self,
        tag: &Tag,
        method: &DocumentedMethod,
        parsed_comment: &str,
        threshold: f64,
        raw_scores: Vec<(CandidateElement, f64)>,
        strategy: &DistanceStrategy,
        ground_truth: Option<&str>,
    ) -> Option<SemanticMatch> {
        let filtering = !is_threshold_disabled(threshold);
        let mut kept: Vec<(CandidateElement, f64)> = raw_scores
            .into_iter()
            .filter(|(candidate, _)| candidate.belongs_to(method))
            .filter(|(_, score)| !filtering || *score <= threshold)
            .collect();
        if kept.is_empty() {
            return None;
        }

        // Vec::sort_by is stable
        let order = strategy.rank_order();
        kept.sort_by(|a, b| order.compare(a.1, b.1));

        let (is_correct, is_partially_correct) = match ground_truth {
            Some(truth) => (
                expressions_match(&kept[0].0.expression, truth),
                kept.iter().any(|(c, _)| expressions_match(&c.expression, truth)),
            ),
            None => (false, false),
        };

        let mut candidates = IndexMap::with_capacity(kept.len());
        for (candidate, score) in kept {
            // a repeated candidate keeps its first (best) rank
            candidates.entry(candidate).or_insert(score);
        }

        Some(SemanticMatch {
            tag: tag.clone(),
            method_name: method.name().to_string(),
            method_signature: method.signature.clone(),
            parsed_comment: parsed_comment.to_string(),
            threshold_used: threshold,
            strategy: strategy.kind(),
            candidates,
            is_correct,
            is_partially_correct,
            ground_truth: ground_truth.map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::THRESHOLD_DISABLED;
    use crate::core::model::TagKind;
    use crate::embedding::EmbeddingTable;
    use std::sync::Arc;

    const SIG: &str = "java.util.List.isEmpty()";

    fn cosine() -> DistanceStrategy {
        DistanceStrategy::Cosine {
            lookup: Arc::new(EmbeddingTable::default()),
        }
    }

    fn conceptual() -> DistanceStrategy {
        DistanceStrategy::Conceptual {
            lookup: Arc::new(EmbeddingTable::default()),
        }
    }

    fn candidate(expr: &str) -> CandidateElement {
        CandidateElement::new(SIG, [expr], expr)
    }

    fn scores() -> Vec<(CandidateElement, f64)> {
        vec![
            (candidate("size()"), 0.4),
            (candidate("isEmpty()"), 0.1),
            (candidate("clear()"), 0.9),
            (candidate("hashCode()"), 0.4),
        ]
    }

    fn rank(threshold: f64, strategy: &DistanceStrategy, truth: Option<&str>) -> Option<SemanticMatch> {
        let tag = Tag::new(TagKind::Return, "true if empty", "receiver.isEmpty()");
        MatchRanker::new().rank(
            &tag,
            &DocumentedMethod::new(SIG),
            "empty",
            threshold,
            scores(),
            strategy,
            truth,
        )
    }

    fn order(m: &SemanticMatch) -> Vec<&str> {
        m.candidates.keys().map(|c| c.expression.as_str()).collect()
    }

    #[test]
    fn ascending_order_with_stable_ties() {
        let m = rank(THRESHOLD_DISABLED, &cosine(), None).unwrap();
        assert_eq!(order(&m), vec!["isEmpty()", "size()", "hashCode()", "clear()"]);
        assert_eq!(m.method_name, "isEmpty");
        assert_eq!(m.threshold_used, THRESHOLD_DISABLED);
    }

    #[test]
    fn descending_order_for_conceptual() {
        let m = rank(THRESHOLD_DISABLED, &conceptual(), None).unwrap();
        assert_eq!(order(&m), vec!["clear()", "size()", "hashCode()", "isEmpty()"]);
    }

    #[test]
    fn threshold_is_inclusive_upper_bound() {
        let m = rank(0.4, &cosine(), None).unwrap();
        assert_eq!(order(&m), vec!["isEmpty()", "size()", "hashCode()"]);
        assert!(m.scores().iter().all(|s| *s <= 0.4));
    }

    #[test]
    fn nothing_survives_tight_threshold() {
        assert!(rank(0.05, &cosine(), None).is_none());
    }

    #[test]
    fn correctness_flags() {
        let m = rank(THRESHOLD_DISABLED, &cosine(), Some("isEmpty()")).unwrap();
        assert!(m.is_correct);
        assert!(m.is_partially_correct);

        let m = rank(THRESHOLD_DISABLED, &cosine(), Some("size( )")).unwrap();
        assert!(!m.is_correct);
        assert!(m.is_partially_correct);

        let m = rank(THRESHOLD_DISABLED, &cosine(), Some("contains(o)")).unwrap();
        assert!(!m.is_correct);
        assert!(!m.is_partially_correct);
        assert_eq!(m.ground_truth.as_deref(), Some("contains(o)"));
    }

    #[test]
    fn foreign_candidates_are_dropped() {
        let tag = Tag::new(TagKind::Return, "c", "x");
        let raw = vec![(CandidateElement::new("other()", ["size"], "size()"), 0.1)];
        let m = MatchRanker::new().rank(
            &tag,
            &DocumentedMethod::new(SIG),
            "c",
            THRESHOLD_DISABLED,
            raw,
            &cosine(),
            None,
        );
        assert!(m.is_none());
    }
}
