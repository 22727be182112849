//! Scoring, ranking and persistence of comment/candidate matches.

pub mod pipeline;
pub mod ranker;
pub mod store;
pub mod strategy;
pub mod transport;

pub use pipeline::SemanticMatcher;
pub use ranker::MatchRanker;
pub use store::{clear_destination, ResultStore, RunSummary};
pub use strategy::{DistanceStrategy, RankOrder, Representation, WORD_TRANSPORT_SENTINEL};
pub use transport::{VocabularyGap, WordMoversDistance, WordTransport};
