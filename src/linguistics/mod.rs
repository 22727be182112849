//! Linguistic preprocessing for comments and identifiers.
//!
//! Comments and code identifiers go through the same steps before they can be
//! compared: cleaning, lemmatization and stopword blanking. Frequency counts
//! over a candidate set mark identifier words that are too common to help.

pub mod frequency;
pub mod identifier;
pub mod lemmatizer;
pub mod normalizer;
pub mod stopwords;

pub use frequency::{compute_frequencies, TermFrequencies, EXCLUSION_CUTOFF};
pub use identifier::{split_camel_case, IdentifierTokenizer};
pub use lemmatizer::{apply_lemmas, LanguageTools, RuleLemmatizer};
pub use normalizer::{strip_punctuation, CommentNormalizer};
pub use stopwords::{is_stopword, StopwordFilter};
