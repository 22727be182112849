//! # docalign-rs: Documentation-to-Code Alignment
//!
//! Ranks candidate code expressions against the natural-language comments of
//! documentation tags, to propose which expression a sentence such as
//! "returns true if the list is empty" is about.
//!
//! - **Linguistics**: comment cleaning, lemmatization, stopword removal and
//!   camel-case identifier splitting
//! - **Embeddings**: GloVe-style word-vector tables, optional model-backed
//!   vectors, vector aggregation and cosine distance
//! - **Matching**: cosine, conceptual and word-transport strategies, threshold
//!   filtering, stable ranking and ground-truth bookkeeping
//! - **I/O**: extractor input loading and append-only JSON results
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SemanticMatcher                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Linguistics   │  Embedding    │  Matching      │  I/O       │
//! │ • Normalizer   │ • Table       │ • Strategy     │ • Input    │
//! │ • Identifier   │ • Model       │ • Transport    │ • Output   │
//! │ • Frequency    │ • Aggregate   │ • Ranker/Store │            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use docalign_rs::{EmbeddingTable, MatchConfig, MatchInputs, RuleLemmatizer, SemanticMatcher};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MatchConfig::for_class("java.util.ArrayList").with_threshold(0.5);
//!     let table = EmbeddingTable::from_file("glove.6B.300d.txt")?;
//!     let inputs = MatchInputs::load("methods.json", "candidates.json", None)?;
//!
//!     let matcher = SemanticMatcher::new(config, Arc::new(RuleLemmatizer::new()), Arc::new(table));
//!     let summary = matcher.run_to_file(&inputs.methods, &inputs.candidates, &inputs.ground_truth, true)?;
//!     println!("{} matches, precision {:.2}", summary.matches, summary.precision());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core data model, configuration and errors
pub mod core {
    //! Data model, configuration and error types.

    pub mod config;
    pub mod errors;
    pub mod model;
}

pub mod embedding;
pub mod io;
pub mod linguistics;
pub mod matching;

// Re-export primary types for convenience
pub use crate::core::config::{
    EmbeddingConfig, EmbeddingModel, EmbeddingSource, MatchConfig, OutputConfig, StrategyKind,
    TransportConfig, THRESHOLD_DISABLED,
};
pub use crate::core::errors::{DocAlignError, Result, ResultExt};
pub use crate::core::model::{
    CandidateElement, DocumentedMethod, GroundTruth, GroundTruthEntry, SemanticMatch, Tag,
    TagKind, WordSet,
};
pub use crate::embedding::{open_lookup, EmbeddingLookup, EmbeddingTable};
#[cfg(feature = "model")]
pub use crate::embedding::ModelEmbeddings;
pub use crate::io::{read_results, summarize_results, MatchInputs};
pub use crate::linguistics::{LanguageTools, RuleLemmatizer};
pub use crate::matching::{
    DistanceStrategy, MatchRanker, RankOrder, ResultStore, RunSummary, SemanticMatcher,
    VocabularyGap, WordMoversDistance, WordTransport, WORD_TRANSPORT_SENTINEL,
};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build-time feature detection
pub mod features {
    //! Runtime feature detection.

    /// Check if model-backed embeddings are available
    pub const fn has_model_embeddings() -> bool {
        cfg!(feature = "model")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
        assert_eq!(features::has_model_embeddings(), cfg!(feature = "model"));
    }
}
