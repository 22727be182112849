//! Built-in stopword list and the token blanking routine shared by comments
//! and identifiers.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Function words plus noise words common in API documentation.
///
/// Entries are lemmas: tokens are compared after lemmatization.
const STOPWORDS: &[&str] = &[
    // Boolean literals describe the return value, not the subject
    "true", "false",
    // Articles, copulas and auxiliaries
    "the", "a", "an", "be", "is", "are", "was", "were", "do", "does", "did", "have",
    // Demonstratives and connectives
    "this", "that", "these", "those", "if", "of", "to", "in", "for", "with", "by", "at",
    // Documentation noise
    "specify", "specified", "already", "only", "given", "otherwise", "respectively",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());

/// Whether `word` (any case) is in the built-in stopword list.
pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word.to_lowercase().as_str())
}

/// Blanks stopwords and the owning class's simple name out of a token array.
#[derive(Debug, Clone)]
pub struct StopwordFilter {
    class_name: String,
}

impl StopwordFilter {
    /// Filter that additionally drops `class_simple_name` (case-insensitive).
    pub fn new(class_simple_name: &str) -> Self {
        Self {
            class_name: class_simple_name.trim().to_lowercase(),
        }
    }

    /// Whether a single token would be blanked.
    pub fn is_filtered(&self, token: &str) -> bool {
        let lower = token.to_lowercase();
        (!self.class_name.is_empty() && lower == self.class_name)
            || STOPWORD_SET.contains(lower.as_str())
    }

    /// Replace every filtered token with the empty string, keeping positions.
    pub fn blank(&self, tokens: &mut [String]) {
        for token in tokens.iter_mut() {
            if self.is_filtered(token) {
                token.clear();
            }
        }
    }
}
