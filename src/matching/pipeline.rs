//! Matching pipeline over every (method, tag) pair.
//!
//! Pairs are independent: each reads the shared lookup, the linguistic tools
//! and its method's frequency map, and produces at most one
//! [`SemanticMatch`]. They are processed with rayon and collected into a
//! [`ResultStore`] under their enumeration ordinal, so the exported file does
//! not depend on scheduling.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::config::MatchConfig;
use crate::core::errors::Result;
use crate::core::model::{CandidateElement, DocumentedMethod, GroundTruth, SemanticMatch, Tag};
use crate::embedding::EmbeddingLookup;
use crate::linguistics::{compute_frequencies, CommentNormalizer, IdentifierTokenizer, LanguageTools, TermFrequencies};

use super::ranker::MatchRanker;
use super::store::{clear_destination, ResultStore, RunSummary};
use super::strategy::DistanceStrategy;
use super::transport::{WordMoversDistance, WordTransport};

/// Ranks candidate expressions against documentation tags.
pub struct SemanticMatcher {
    config: MatchConfig,
    tools: Arc<dyn LanguageTools>,
    strategy: DistanceStrategy,
    ranker: MatchRanker,
}

impl SemanticMatcher {
    /// Matcher for `config`; word transport runs over `lookup`.
    pub fn new(
        config: MatchConfig,
        tools: Arc<dyn LanguageTools>,
        lookup: Arc<dyn EmbeddingLookup>,
    ) -> Self {
        let transport: Arc<dyn WordTransport> =
            Arc::new(WordMoversDistance::new(Arc::clone(&lookup), &config.transport));
        Self::with_transport(config, tools, lookup, transport)
    }

    /// Matcher with an explicit word-transport backend.
    pub fn with_transport(
        config: MatchConfig,
        tools: Arc<dyn LanguageTools>,
        lookup: Arc<dyn EmbeddingLookup>,
        transport: Arc<dyn WordTransport>,
    ) -> Self {
        let strategy = DistanceStrategy::new(config.strategy, lookup, transport);
        Self {
            config,
            tools,
            strategy,
            ranker: MatchRanker::new(),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Strategy in use.
    pub fn strategy(&self) -> &DistanceStrategy {
        &self.strategy
    }

    /// Frequency map for one method's candidates, when TF exclusion applies.
    pub fn frequencies_for(&self, candidates: &[&CandidateElement]) -> Option<TermFrequencies> {
        if !self.config.tfidf || !self.strategy.uses_frequencies() {
            return None;
        }
        let tokenizer = IdentifierTokenizer::new(self.tools.as_ref());
        Some(compute_frequencies(candidates.iter().copied(), &tokenizer))
    }

    /// Match a single tag against its method's candidates.
    pub fn match_tag(
        &self,
        method: &DocumentedMethod,
        tag: &Tag,
        candidates: &[&CandidateElement],
        frequencies: Option<&TermFrequencies>,
        ground_truth: Option<&str>,
    ) -> Option<SemanticMatch> {
        if candidates.is_empty() {
            debug!(method = %method.signature, "no candidates; tag skipped");
            return None;
        }

        let normalizer = CommentNormalizer::new(self.tools.as_ref());
        let words = normalizer.normalize(tag, method, &self.config);
        if words.is_empty() {
            debug!(method = %method.signature, comment = %tag.comment, "empty comment word set");
            return None;
        }
        let parsed_comment = words.joined();

        let Some(comment_repr) = self.strategy.comment_repr(&words) else {
            debug!(method = %method.signature, "no vector for comment {:?}", parsed_comment);
            return None;
        };

        let tokenizer = IdentifierTokenizer::new(self.tools.as_ref());
        let raw_scores: Vec<(CandidateElement, f64)> = candidates
            .iter()
            .filter_map(|candidate| {
                let repr = self.strategy.build_candidate_repr(
                    candidate,
                    frequencies,
                    &tokenizer,
                    &self.config,
                )?;
                let score = self.strategy.score(&comment_repr, &repr)?;
                Some(((*candidate).clone(), score))
            })
            .collect();

        let ranked = self.ranker.rank(
            tag,
            method,
            &parsed_comment,
            self.config.distance_threshold,
            raw_scores,
            &self.strategy,
            ground_truth,
        );
        if let Some(m) = &ranked {
            debug!(
                method = %method.signature,
                kind = %tag.kind,
                candidates = m.candidates.len(),
                top = ?m.top_candidate().map(|(c, s)| (c.expression.as_str(), s)),
                "ranked tag"
            );
        }
        ranked
    }

    /// Ground truth for `tag`: the supplied entry, else the tag's condition
    /// when configured.
    fn ground_truth_for<'a>(
        &self,
        truth: &'a GroundTruth,
        method: &DocumentedMethod,
        tag: &'a Tag,
    ) -> Option<&'a str> {
        truth
            .expression_for(&method.signature, tag)
            .or_else(|| self.config.condition_as_ground_truth.then(|| tag.condition_text()))
    }

    /// Match every analyzable tag of `methods` and store the results.
    pub fn run(
        &self,
        methods: &[DocumentedMethod],
        candidates: &[CandidateElement],
        ground_truth: &GroundTruth,
        store: &ResultStore,
    ) -> RunSummary {
        let start = Instant::now();

        let mut by_owner: HashMap<&str, Vec<&CandidateElement>> = HashMap::new();
        for candidate in candidates {
            by_owner
                .entry(candidate.owner_method_signature.as_str())
                .or_default()
                .push(candidate);
        }

        let frequencies: HashMap<&str, TermFrequencies> = methods
            .par_iter()
            .filter_map(|method| {
                let owned = by_owner.get(method.signature.as_str())?;
                self.frequencies_for(owned)
                    .map(|tf| (method.signature.as_str(), tf))
            })
            .collect();

        let pairs: Vec<(&DocumentedMethod, &Tag)> = methods
            .iter()
            .flat_map(|method| method.analyzable_tags().map(move |tag| (method, tag)))
            .collect();
        info!(
            methods = methods.len(),
            candidates = candidates.len(),
            tags = pairs.len(),
            strategy = %self.strategy.kind(),
            "Matching documentation tags"
        );

        pairs.par_iter().enumerate().for_each(|(ordinal, (method, tag))| {
            let owned = by_owner
                .get(method.signature.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            let tf = frequencies.get(method.signature.as_str());
            let truth = self.ground_truth_for(ground_truth, method, tag);
            if let Some(m) = self.match_tag(method, tag, owned, tf, truth) {
                store.insert_at(ordinal, m);
            }
        });

        let summary = store.summary(pairs.len());
        info!(
            matches = summary.matches,
            correct = summary.correct,
            partially_correct = summary.partially_correct,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Matching complete"
        );
        summary
    }

    /// Run and append the results to the configured results file.
    ///
    /// With `fresh`, the results file is removed first.
    pub fn run_to_file(
        &self,
        methods: &[DocumentedMethod],
        candidates: &[CandidateElement],
        ground_truth: &GroundTruth,
        fresh: bool,
    ) -> Result<RunSummary> {
        let destination = self.config.results_path();
        self.run_to_path(methods, candidates, ground_truth, &destination, fresh)
    }

    /// Run and append the results to `destination`.
    pub fn run_to_path(
        &self,
        methods: &[DocumentedMethod],
        candidates: &[CandidateElement],
        ground_truth: &GroundTruth,
        destination: &Path,
        fresh: bool,
    ) -> Result<RunSummary> {
        if fresh {
            clear_destination(destination)?;
        }
        let store = ResultStore::new();
        let mut summary = self.run(methods, candidates, ground_truth, &store);
        summary.exported = store.export_all(destination, self.config.output.pretty)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StrategyKind;
    use crate::core::model::{GroundTruthEntry, TagKind};
    use crate::embedding::EmbeddingTable;
    use crate::linguistics::RuleLemmatizer;

    const SIG: &str = "java.util.List.isEmpty()";

    fn lookup() -> Arc<dyn EmbeddingLookup> {
        Arc::new(
            EmbeddingTable::from_entries(vec![
                ("return", vec![0.0, 0.0, 1.0]),
                ("empty", vec![1.0, 0.0, 0.0]),
                ("size", vec![0.0, 1.0, 0.0]),
                ("list", vec![0.2, 0.2, 0.0]),
            ])
            .unwrap(),
        )
    }

    fn matcher(config: MatchConfig) -> SemanticMatcher {
        SemanticMatcher::new(config, Arc::new(RuleLemmatizer::new()), lookup())
    }

    fn inputs() -> (Vec<DocumentedMethod>, Vec<CandidateElement>) {
        let method = DocumentedMethod::new(SIG)
            .with_tag(Tag::new(TagKind::Return, "true if the list is empty", "receiver.isEmpty()"))
            .with_tag(Tag::new(TagKind::Return, "no condition here", ""));
        let candidates = vec![
            CandidateElement::new(SIG, ["size"], "receiver.size()"),
            CandidateElement::new(SIG, ["isEmpty"], "receiver.isEmpty()"),
            CandidateElement::new("other()", ["isEmpty"], "other.isEmpty()"),
        ];
        (vec![method], candidates)
    }

    #[test]
    fn run_matches_only_tags_with_conditions() {
        let (methods, candidates) = inputs();
        let store = ResultStore::new();
        let summary = matcher(MatchConfig::for_class("List")).run(
            &methods,
            &candidates,
            &GroundTruth::default(),
            &store,
        );

        assert_eq!(summary.tags_analyzed, 1);
        assert_eq!(summary.matches, 1);
        let m = &store.matches()[0];
        assert_eq!(m.parsed_comment, "empty");
        assert_eq!(m.candidates.len(), 2);
        assert_eq!(m.top_candidate().unwrap().0.expression, "receiver.isEmpty()");
        assert!(m.candidates.keys().all(|c| c.owner_method_signature == SIG));
    }

    #[test]
    fn ground_truth_from_file_or_condition() {
        let (methods, candidates) = inputs();

        let truth = GroundTruth::from_entries(vec![GroundTruthEntry {
            method_signature: SIG.into(),
            kind: TagKind::Return,
            comment: None,
            expression: "receiver.size()".into(),
        }]);
        let store = ResultStore::new();
        matcher(MatchConfig::for_class("List")).run(&methods, &candidates, &truth, &store);
        let m = &store.matches()[0];
        assert!(!m.is_correct);
        assert!(m.is_partially_correct);

        let mut config = MatchConfig::for_class("List");
        config.condition_as_ground_truth = true;
        let store = ResultStore::new();
        matcher(config).run(&methods, &candidates, &GroundTruth::default(), &store);
        let m = &store.matches()[0];
        assert!(m.is_correct);
        assert_eq!(m.ground_truth.as_deref(), Some("receiver.isEmpty()"));
    }

    #[test]
    fn method_without_candidates_produces_nothing() {
        let (methods, _) = inputs();
        let store = ResultStore::new();
        let summary = matcher(MatchConfig::for_class("List")).run(
            &methods,
            &[],
            &GroundTruth::default(),
            &store,
        );
        assert_eq!(summary.matches, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn comment_of_only_stopwords_is_skipped() {
        let method = DocumentedMethod::new(SIG).with_tag(Tag::new(TagKind::Return, "true if this is", "x"));
        let candidates = vec![CandidateElement::new(SIG, ["isEmpty"], "isEmpty()")];
        let store = ResultStore::new();
        matcher(MatchConfig::for_class("List")).run(&[method], &candidates, &GroundTruth::default(), &store);
        assert!(store.is_empty());
    }

    #[test]
    fn conceptual_reverses_ranking() {
        let (methods, candidates) = inputs();
        let store = ResultStore::new();
        matcher(MatchConfig::for_class("List").with_strategy(StrategyKind::Conceptual)).run(
            &methods,
            &candidates,
            &GroundTruth::default(),
            &store,
        );
        let m = &store.matches()[0];
        assert_eq!(m.top_candidate().unwrap().0.expression, "receiver.size()");
        assert_eq!(m.strategy, StrategyKind::Conceptual);
    }

    #[test]
    fn run_to_path_appends_and_fresh_clears() {
        let (methods, candidates) = inputs();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("semantic_List_results.json");
        let mut config = MatchConfig::for_class("List");
        config.output.pretty = false;
        let m = matcher(config);

        m.run_to_path(&methods, &candidates, &GroundTruth::default(), &path, false)
            .unwrap();
        let summary = m
            .run_to_path(&methods, &candidates, &GroundTruth::default(), &path, false)
            .unwrap();
        assert_eq!(summary.exported, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);

        m.run_to_path(&methods, &candidates, &GroundTruth::default(), &path, true)
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }
}
