//! Identifier tokenization: `isEmpty` -> `["be", "empty"]`.

use crate::core::config::MatchConfig;
use crate::core::model::CandidateElement;

use super::lemmatizer::{apply_lemmas, LanguageTools};
use super::stopwords::StopwordFilter;

/// Split an identifier before every ASCII uppercase letter except the first
/// character. Pieces are lowercased; empty pieces are dropped.
pub fn split_camel_case(identifier: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for (idx, ch) in identifier.char_indices() {
        if idx > 0 && ch.is_ascii_uppercase() && !current.is_empty() {
            pieces.push(std::mem::take(&mut current).to_lowercase());
        }
        if !ch.is_whitespace() {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        pieces.push(current.to_lowercase());
    }
    pieces
}

/// Splits code-element identifiers into lemmatized sub-words.
pub struct IdentifierTokenizer<'a> {
    tools: &'a dyn LanguageTools,
}

impl<'a> IdentifierTokenizer<'a> {
    /// Create a tokenizer backed by the given linguistic tools.
    pub fn new(tools: &'a dyn LanguageTools) -> Self {
        Self { tools }
    }

    /// Ordered lemmatized sub-words of a single identifier.
    pub fn tokenize(&self, identifier: &str) -> Vec<String> {
        let mut pieces = split_camel_case(identifier);
        if pieces.is_empty() {
            return pieces;
        }
        let joined = pieces.join(" ");
        let lemmas = self.tools.lemmatize(&joined);
        apply_lemmas(&mut pieces, &lemmas, &joined);
        pieces
    }

    /// Sub-words of every identifier of `candidate`, in identifier order, with
    /// stopwords blanked and removed when the configuration asks for it.
    pub fn candidate_words(&self, candidate: &CandidateElement, config: &MatchConfig) -> Vec<String> {
        let filter = config
            .stopwords_removal
            .then(|| StopwordFilter::new(config.class_simple_name()));

        let mut words = Vec::new();
        for identifier in &candidate.identifiers {
            let mut tokens = self.tokenize(identifier);
            if let Some(filter) = &filter {
                filter.blank(&mut tokens);
            }
            words.extend(tokens.into_iter().filter(|t| !t.is_empty()));
        }
        words
    }
}
