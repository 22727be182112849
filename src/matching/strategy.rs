//! Distance strategies.
//!
//! A strategy decides how both sides of a comparison are represented, how a
//! pair is scored, and which end of the score range is best. The set is
//! closed and chosen from [`StrategyKind`].

use std::sync::Arc;

use tracing::debug;

use crate::core::config::{MatchConfig, StrategyKind};
use crate::core::model::{CandidateElement, WordSet};
use crate::embedding::{aggregate, cosine_distance, EmbeddingLookup};
use crate::linguistics::{IdentifierTokenizer, TermFrequencies};

use super::transport::WordTransport;

/// Score substituted when the word-transport backend cannot resolve a side.
pub const WORD_TRANSPORT_SENTINEL: f64 = 10.0;

/// Which end of the score range ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Smallest score first
    Ascending,
    /// Largest score first
    Descending,
}

impl RankOrder {
    /// Compare two scores so that the better one sorts first.
    pub fn compare(&self, a: f64, b: f64) -> std::cmp::Ordering {
        let ord = a.total_cmp(&b);
        match self {
            RankOrder::Ascending => ord,
            RankOrder::Descending => ord.reverse(),
        }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Representation {
    /// Aggregated embedding vector
    Vector(Vec<f32>),
    /// Space-joined normalized words
    Text(String),
}

/// Scoring strategy with its backend.
#[derive(Clone)]
pub enum DistanceStrategy {
    /// Cosine distance of aggregated vectors, smallest first
    Cosine {
        /// Word-vector source
        lookup: Arc<dyn EmbeddingLookup>,
    },
    /// Cosine distance of aggregated vectors, largest first
    Conceptual {
        /// Word-vector source
        lookup: Arc<dyn EmbeddingLookup>,
    },
    /// Word transport cost between normalized word strings
    WordTransport {
        /// Transport backend
        transport: Arc<dyn WordTransport>,
    },
}

impl DistanceStrategy {
    /// Strategy for `kind` over the given backends.
    pub fn new(
        kind: StrategyKind,
        lookup: Arc<dyn EmbeddingLookup>,
        transport: Arc<dyn WordTransport>,
    ) -> Self {
        match kind {
            StrategyKind::Cosine => DistanceStrategy::Cosine { lookup },
            StrategyKind::Conceptual => DistanceStrategy::Conceptual { lookup },
            StrategyKind::WordTransport => DistanceStrategy::WordTransport { transport },
        }
    }

    /// Configuration name of this strategy.
    pub fn kind(&self) -> StrategyKind {
        match self {
            DistanceStrategy::Cosine { .. } => StrategyKind::Cosine,
            DistanceStrategy::Conceptual { .. } => StrategyKind::Conceptual,
            DistanceStrategy::WordTransport { .. } => StrategyKind::WordTransport,
        }
    }

    /// Ranking direction.
    pub fn rank_order(&self) -> RankOrder {
        match self {
            DistanceStrategy::Conceptual { .. } => RankOrder::Descending,
            DistanceStrategy::Cosine { .. } | DistanceStrategy::WordTransport { .. } => {
                RankOrder::Ascending
            }
        }
    }

    /// Whether this strategy consumes candidate-set frequencies.
    pub fn uses_frequencies(&self) -> bool {
        !matches!(self, DistanceStrategy::WordTransport { .. })
    }

    /// Representation of a normalized comment, `None` when no vector resolves.
    pub fn comment_repr(&self, words: &WordSet) -> Option<Representation> {
        match self {
            DistanceStrategy::Cosine { lookup } | DistanceStrategy::Conceptual { lookup } => {
                aggregate(words.iter(), lookup.as_ref()).map(Representation::Vector)
            }
            DistanceStrategy::WordTransport { .. } => Some(Representation::Text(words.joined())),
        }
    }

    /// Representation of a candidate.
    ///
    /// Cosine strategies drop words whose frequency reaches the exclusion
    /// cutoff when `frequencies` is given.
    pub fn build_candidate_repr(
        &self,
        candidate: &CandidateElement,
        frequencies: Option<&TermFrequencies>,
        tokenizer: &IdentifierTokenizer<'_>,
        config: &MatchConfig,
    ) -> Option<Representation> {
        let words = tokenizer.candidate_words(candidate, config);
        match self {
            DistanceStrategy::Cosine { lookup } | DistanceStrategy::Conceptual { lookup } => {
                let kept = words
                    .iter()
                    .map(String::as_str)
                    .filter(|w| frequencies.map_or(true, |tf| !tf.is_excluded(w)));
                aggregate(kept, lookup.as_ref()).map(Representation::Vector)
            }
            DistanceStrategy::WordTransport { .. } => Some(Representation::Text(words.join(" "))),
        }
    }

    /// Score a pair. `None` when the representations cannot be compared.
    pub fn score(&self, comment: &Representation, candidate: &Representation) -> Option<f64> {
        match (self, comment, candidate) {
            (
                DistanceStrategy::Cosine { .. } | DistanceStrategy::Conceptual { .. },
                Representation::Vector(a),
                Representation::Vector(b),
            ) => Some(cosine_distance(a, b)),
            (
                DistanceStrategy::WordTransport { transport },
                Representation::Text(a),
                Representation::Text(b),
            ) => Some(transport.distance(a, b).unwrap_or_else(|gap| {
                debug!("{}; using sentinel score", gap);
                WORD_TRANSPORT_SENTINEL
            })),
            _ => None,
        }
    }
}

impl std::fmt::Debug for DistanceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceStrategy")
            .field("kind", &self.kind())
            .field("rank_order", &self.rank_order())
            .finish()
    }
}
