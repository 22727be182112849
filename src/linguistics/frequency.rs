//! Candidate-set term frequencies used to suppress non-discriminating words.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::model::CandidateElement;

use super::identifier::IdentifierTokenizer;

/// Words whose frequency reaches this value are excluded from aggregation.
pub const EXCLUSION_CUTOFF: f64 = 0.5;

/// Document frequencies over one candidate set.
#[derive(Debug, Clone, Default)]
pub struct TermFrequencies {
    /// Number of candidates containing each word
    document_frequencies: HashMap<String, usize>,
    /// Total candidates seen
    total_documents: usize,
}

impl TermFrequencies {
    /// Create an empty frequency map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one candidate's words. Repeated words count once.
    pub fn add_document<S: AsRef<str>>(&mut self, words: &[S]) {
        self.total_documents += 1;

        let unique: HashSet<String> = words
            .iter()
            .map(|w| w.as_ref().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        for word in unique {
            *self.document_frequencies.entry(word).or_insert(0) += 1;
        }
    }

    /// Fraction of candidates containing `word`; unknown words have frequency 0.
    pub fn frequency(&self, word: &str) -> f64 {
        if self.total_documents == 0 {
            return 0.0;
        }
        let df = self
            .document_frequencies
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(0);
        df as f64 / self.total_documents as f64
    }

    /// Whether `word` is too common to be discriminating.
    pub fn is_excluded(&self, word: &str) -> bool {
        self.frequency(word) >= EXCLUSION_CUTOFF
    }

    /// Total candidates seen.
    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    /// Corpus statistics.
    pub fn stats(&self) -> FrequencyStats {
        FrequencyStats {
            total_documents: self.total_documents,
            unique_words: self.document_frequencies.len(),
            excluded_words: self
                .document_frequencies
                .keys()
                .filter(|w| self.is_excluded(w))
                .count(),
        }
    }
}

/// Summary of a frequency map, for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyStats {
    /// Candidates in the set
    pub total_documents: usize,
    /// Distinct words
    pub unique_words: usize,
    /// Words at or above the exclusion cutoff
    pub excluded_words: usize,
}

/// Frequencies of identifier sub-words across `candidates`.
pub fn compute_frequencies<'c, I>(candidates: I, tokenizer: &IdentifierTokenizer<'_>) -> TermFrequencies
where
    I: IntoIterator<Item = &'c CandidateElement>,
{
    let mut frequencies = TermFrequencies::new();
    for candidate in candidates {
        let words: Vec<String> = candidate
            .identifiers
            .iter()
            .flat_map(|id| tokenizer.tokenize(id))
            .collect();
        frequencies.add_document(&words);
    }
    frequencies
}
