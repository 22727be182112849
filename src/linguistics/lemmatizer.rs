//! Part-of-speech and lemmatization seam.
//!
//! The matching core only needs two operations from a linguistic toolkit,
//! captured by [`LanguageTools`]. [`RuleLemmatizer`] is a dependency-free
//! English implementation good enough for API documentation; heavier taggers
//! can be plugged in behind the same trait.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::core::model::DocumentedMethod;

/// Linguistic operations consumed by normalization.
///
/// Implementations are shared across worker threads and must tolerate
/// concurrent calls.
pub trait LanguageTools: Send + Sync {
    /// Lemmas for the whitespace-separated words of `text`, in order.
    fn lemmatize(&self, text: &str) -> Vec<String>;

    /// Subject and predicate of `comment`, i.e. the part of the sentence that
    /// names what the documented behaviour is about.
    fn subject_predicate(&self, comment: &str, method: &DocumentedMethod) -> String;
}

/// Overwrite `tokens` with `lemmas` position by position.
///
/// A count mismatch is logged and substitution proceeds over the common
/// prefix; empty lemmas leave the token untouched.
pub fn apply_lemmas(tokens: &mut [String], lemmas: &[String], text: &str) {
    if tokens.len() != lemmas.len() {
        warn!(
            tokens = tokens.len(),
            lemmas = lemmas.len(),
            "lemma count mismatch for {:?}; substituting positionally",
            text
        );
    }
    for (token, lemma) in tokens.iter_mut().zip(lemmas) {
        if !lemma.is_empty() {
            token.clone_from(lemma);
        }
    }
}

static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("is", "be"),
        ("are", "be"),
        ("was", "be"),
        ("were", "be"),
        ("am", "be"),
        ("been", "be"),
        ("being", "be"),
        ("has", "have"),
        ("had", "have"),
        ("having", "have"),
        ("does", "do"),
        ("did", "do"),
        ("done", "do"),
        ("doing", "do"),
        ("an", "a"),
        ("children", "child"),
        ("indices", "index"),
        ("vertices", "vertex"),
        ("matrices", "matrix"),
        ("used", "use"),
        ("uses", "use"),
        ("based", "base"),
        ("closed", "close"),
        ("named", "name"),
        ("sized", "size"),
        ("caused", "cause"),
        ("gave", "give"),
        ("given", "give"),
        ("found", "find"),
        ("made", "make"),
        ("kept", "keep"),
        ("left", "leave"),
        ("contained", "contain"),
        ("less", "less"),
        ("unless", "unless"),
        ("always", "always"),
        ("its", "its"),
        ("this", "this"),
        ("thus", "thus"),
        ("caches", "cache"),
        ("nothing", "nothing"),
        ("something", "something"),
        ("anything", "anything"),
        ("during", "during"),
    ]
    .into_iter()
    .collect()
});

/// Stems that regain a trailing `e` once `-ed` / `-ing` is removed.
const E_RESTORING_ENDINGS: &[&str] = &["v", "iz", "at", "bl", "ur", "rc"];

/// Suffix-rule English lemmatizer.
#[derive(Debug, Clone, Default)]
pub struct RuleLemmatizer;

impl RuleLemmatizer {
    /// Create a new lemmatizer.
    pub fn new() -> Self {
        Self
    }

    /// Lemma of a single word, lowercased.
    pub fn lemma(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if let Some(irregular) = IRREGULAR.get(lower.as_str()) {
            return (*irregular).to_string();
        }
        if lower.len() <= 3 || !lower.chars().all(|c| c.is_ascii_alphabetic()) {
            return lower;
        }

        if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
            return lower;
        }
        if let Some(stem) = lower.strip_suffix("ies") {
            return format!("{stem}y");
        }
        for suffix in ["sses", "shes", "ches", "xes"] {
            if lower.ends_with(suffix) {
                return lower[..lower.len() - 2].to_string();
            }
        }
        if let Some(stem) = lower.strip_suffix('s') {
            return stem.to_string();
        }
        if let Some(stem) = lower.strip_suffix("ied") {
            return format!("{stem}y");
        }
        if lower.len() > 4 {
            if let Some(stem) = lower.strip_suffix("ed") {
                if stem.ends_with('e') {
                    return lower;
                }
                return Self::repair_stem(stem);
            }
        }
        if lower.len() > 5 {
            if let Some(stem) = lower.strip_suffix("ing") {
                return Self::repair_stem(stem);
            }
        }
        lower
    }

    fn repair_stem(stem: &str) -> String {
        if !stem.chars().any(|c| "aeiouy".contains(c)) {
            return format!("{stem}ing");
        }
        let bytes = stem.as_bytes();
        let n = bytes.len();
        if n >= 2 && bytes[n - 1] == bytes[n - 2] && !matches!(bytes[n - 1], b'l' | b's' | b'z') {
            return stem[..n - 1].to_string();
        }
        if E_RESTORING_ENDINGS.iter().any(|end| stem.ends_with(end)) {
            return format!("{stem}e");
        }
        stem.to_string()
    }
}

/// Markers introducing the condition clause of a documentation sentence.
const CLAUSE_MARKERS: &[&str] = &["if", "iff", "when", "whenever", "whether", "unless"];

impl LanguageTools for RuleLemmatizer {
    fn lemmatize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(|word| self.lemma(word)).collect()
    }

    fn subject_predicate(&self, comment: &str, _method: &DocumentedMethod) -> String {
        let words: Vec<&str> = comment.split_whitespace().collect();
        let clause_start = words.iter().position(|w| {
            let w = w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            CLAUSE_MARKERS.contains(&w.as_str())
        });

        match clause_start {
            Some(idx) if idx + 1 < words.len() => words[idx + 1..].join(" "),
            _ => words.join(" "),
        }
    }
}
