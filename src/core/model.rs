//! Data model shared by the normalization, scoring and ranking stages.
//!
//! Records arriving from the documentation extractor ([`DocumentedMethod`],
//! [`Tag`], [`CandidateElement`]) are read-only here; [`SemanticMatch`] is the
//! only record this crate produces.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::core::config::StrategyKind;

/// Kind of documented behaviour a tag describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagKind {
    /// `@return` documentation
    #[serde(alias = "return", alias = "Return")]
    Return,
    /// `@throws` / `@exception` documentation
    #[serde(alias = "throws", alias = "Throws", alias = "EXCEPTION")]
    Throws,
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Return => write!(f, "RETURN"),
            TagKind::Throws => write!(f, "THROWS"),
        }
    }
}

/// A single documented behaviour annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag kind
    pub kind: TagKind,
    /// Raw natural-language comment
    pub comment: String,
    /// Extracted logical condition (empty when the extractor found none)
    #[serde(default)]
    pub condition: String,
    /// Exception type named by a throws tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

impl Tag {
    /// Create a tag with the given kind, comment and condition.
    pub fn new(kind: TagKind, comment: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            kind,
            comment: comment.into(),
            condition: condition.into(),
            exception: None,
        }
    }

    /// The condition with an `Optional[...]` wrapper removed.
    ///
    /// Some extractor versions serialize the optional condition verbatim.
    pub fn condition_text(&self) -> &str {
        let trimmed = self.condition.trim();
        trimmed
            .strip_prefix("Optional[")
            .and_then(|rest| rest.strip_suffix(']'))
            .map(str::trim)
            .unwrap_or(trimmed)
    }

    /// Whether this tag takes part in matching.
    pub fn has_condition(&self) -> bool {
        !self.condition_text().is_empty()
    }
}

/// A documented method as produced by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentedMethod {
    /// Unique signature, e.g. `java.util.List.isEmpty()`
    pub signature: String,
    /// Simple method name; derived from the signature when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Documented tags, in source order
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl DocumentedMethod {
    /// Create a method record with no tags.
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            name: None,
            tags: Vec::new(),
        }
    }

    /// Builder-style tag addition.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Simple name of the method.
    pub fn name(&self) -> &str {
        if let Some(name) = self.name.as_deref() {
            return name;
        }
        let head = self
            .signature
            .split('(')
            .next()
            .unwrap_or(&self.signature)
            .trim();
        head.rsplit(|c: char| c == '.' || c.is_whitespace())
            .next()
            .unwrap_or(head)
    }

    /// Tags with a non-empty condition.
    pub fn analyzable_tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|tag| tag.has_condition())
    }
}

/// A code expression eligible to be the subject of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateElement {
    /// Signature of the method the candidate was collected for
    #[serde(alias = "forMethod")]
    pub owner_method_signature: String,
    /// Raw identifiers making up the expression, e.g. `{"isEmpty"}`
    #[serde(alias = "codeElementIds")]
    pub identifiers: BTreeSet<String>,
    /// Display expression, e.g. `receiver.isEmpty()`
    #[serde(alias = "javaExpression")]
    pub expression: String,
}

impl CandidateElement {
    /// Create a candidate from its owner, identifiers and display expression.
    pub fn new<I, S>(owner: impl Into<String>, identifiers: I, expression: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owner_method_signature: owner.into(),
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            expression: expression.into(),
        }
    }

    /// Whether this candidate was collected for the given method.
    pub fn belongs_to(&self, method: &DocumentedMethod) -> bool {
        self.owner_method_signature == method.signature
    }
}

/// Insertion-ordered set of lowercase lemmatized words.
///
/// Empty strings are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordSet {
    words: IndexSet<String>,
}

impl WordSet {
    /// Create an empty word set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a word, lowercasing it. Returns false for empty or duplicate words.
    pub fn insert(&mut self, word: &str) -> bool {
        let word = word.trim();
        if word.is_empty() {
            return false;
        }
        self.words.insert(word.to_lowercase())
    }

    /// Whether the set contains `word` (already lowercase).
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate words in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Words joined by single spaces.
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = WordSet::new();
        for word in iter {
            set.insert(word.as_ref());
        }
        set
    }
}

/// Ranked outcome of matching one tag against its candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticMatch {
    /// The tag that was matched
    pub tag: Tag,
    /// Simple name of the owning method
    pub method_name: String,
    /// Signature of the owning method
    pub method_signature: String,
    /// Normalized comment words, space-joined
    pub parsed_comment: String,
    /// Threshold applied when filtering (-1 = disabled)
    pub threshold_used: f64,
    /// Strategy that produced the scores
    pub strategy: StrategyKind,
    /// Surviving candidates, best first
    #[serde(with = "ranked_candidates")]
    pub candidates: IndexMap<CandidateElement, f64>,
    /// Top-ranked candidate equals the ground truth
    pub is_correct: bool,
    /// Some surviving candidate equals the ground truth
    pub is_partially_correct: bool,
    /// Expression the correctness flags were computed against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<String>,
}

impl SemanticMatch {
    /// Best-ranked candidate and its score.
    pub fn top_candidate(&self) -> Option<(&CandidateElement, f64)> {
        self.candidates.first().map(|(c, s)| (c, *s))
    }

    /// Scores in rank order.
    pub fn scores(&self) -> Vec<f64> {
        self.candidates.values().copied().collect()
    }
}

/// Serializes the ordered candidate map as a list, keeping rank order.
mod ranked_candidates {
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::CandidateElement;

    #[derive(Serialize)]
    struct RankedRef<'a> {
        candidate: &'a CandidateElement,
        score: f64,
    }

    #[derive(Deserialize)]
    struct Ranked {
        candidate: CandidateElement,
        score: f64,
    }

    pub fn serialize<S>(map: &IndexMap<CandidateElement, f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.iter().map(|(candidate, score)| RankedRef {
            candidate,
            score: *score,
        }))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<IndexMap<CandidateElement, f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<Ranked>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.candidate, entry.score))
            .collect())
    }
}

/// One ground-truth record supplied alongside the extractor output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruthEntry {
    /// Signature of the documented method
    pub method_signature: String,
    /// Kind of the tag
    pub kind: TagKind,
    /// Comment of the tag; `None` matches any tag of this kind on the method
    #[serde(default)]
    pub comment: Option<String>,
    /// Expected code expression
    pub expression: String,
}

/// Ground-truth expressions indexed by method and tag kind.
#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    entries: HashMap<(String, TagKind), Vec<GroundTruthEntry>>,
}

impl GroundTruth {
    /// Build an index from a list of entries.
    pub fn from_entries(entries: impl IntoIterator<Item = GroundTruthEntry>) -> Self {
        let mut index: HashMap<(String, TagKind), Vec<GroundTruthEntry>> = HashMap::new();
        for entry in entries {
            index
                .entry((entry.method_signature.clone(), entry.kind))
                .or_default()
                .push(entry);
        }
        Self { entries: index }
    }

    /// Expected expression for a tag, preferring an entry with a matching comment.
    pub fn expression_for(&self, method_signature: &str, tag: &Tag) -> Option<&str> {
        let candidates = self.entries.get(&(method_signature.to_string(), tag.kind))?;
        candidates
            .iter()
            .find(|e| e.comment.as_deref().map(str::trim) == Some(tag.comment.trim()))
            .or_else(|| candidates.iter().find(|e| e.comment.is_none()))
            .map(|e| e.expression.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether no entries were loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Expression equality ignoring whitespace.
pub fn expressions_match(left: &str, right: &str) -> bool {
    let mut l = left.chars().filter(|c| !c.is_whitespace());
    let mut r = right.chars().filter(|c| !c.is_whitespace());
    loop {
        match (l.next(), r.next()) {
            (None, None) => return true,
            (Some(a), Some(b)) if a == b => continue,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_name_derived_from_signature() {
        let method = DocumentedMethod::new("java.util.ArrayList.isEmpty()");
        assert_eq!(method.name(), "isEmpty");

        let method = DocumentedMethod::new("public boolean contains(java.lang.Object o)");
        assert_eq!(method.name(), "contains");

        let mut named = DocumentedMethod::new("x.y()");
        named.name = Some("custom".into());
        assert_eq!(named.name(), "custom");
    }

    #[test]
    fn optional_wrapper_stripped_from_condition() {
        let tag = Tag::new(TagKind::Return, "c", "Optional[receiver.isEmpty()]");
        assert_eq!(tag.condition_text(), "receiver.isEmpty()");
        assert!(tag.has_condition());

        let empty = Tag::new(TagKind::Return, "c", "Optional[]");
        assert!(!empty.has_condition());
    }

    #[test]
    fn word_set_drops_empty_and_lowercases() {
        let set: WordSet = ["Return", "", "  ", "empty", "return"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("return"));
        assert!(!set.contains(""));
        assert_eq!(set.joined(), "return empty");
    }

    #[test]
    fn semantic_match_round_trips_candidate_order() {
        let mut candidates = IndexMap::new();
        candidates.insert(CandidateElement::new("m()", ["size"], "size()"), 0.3);
        candidates.insert(CandidateElement::new("m()", ["isEmpty"], "isEmpty()"), 0.1);

        let m = SemanticMatch {
            tag: Tag::new(TagKind::Return, "true if empty", "isEmpty()"),
            method_name: "m".into(),
            method_signature: "m()".into(),
            parsed_comment: "empty".into(),
            threshold_used: 0.5,
            strategy: StrategyKind::Cosine,
            candidates,
            is_correct: false,
            is_partially_correct: true,
            ground_truth: Some("isEmpty()".into()),
        };

        let json = serde_json::to_string(&m).unwrap();
        let back: SemanticMatch = serde_json::from_str(&json).unwrap();
        let order: Vec<_> = back.candidates.keys().map(|c| c.expression.as_str()).collect();
        assert_eq!(order, vec!["size()", "isEmpty()"]);
        assert_eq!(back, m);
    }

    #[test]
    fn candidate_accepts_extractor_field_names() {
        let json = r#"{"forMethod":"m()","codeElementIds":["isEmpty"],"javaExpression":"target.isEmpty()"}"#;
        let candidate: CandidateElement = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.owner_method_signature, "m()");
        assert!(candidate.identifiers.contains("isEmpty"));
    }

    #[test]
    fn ground_truth_prefers_comment_specific_entry() {
        let truth = GroundTruth::from_entries(vec![
            GroundTruthEntry {
                method_signature: "m()".into(),
                kind: TagKind::Throws,
                comment: None,
                expression: "generic".into(),
            },
            GroundTruthEntry {
                method_signature: "m()".into(),
                kind: TagKind::Throws,
                comment: Some("if index is negative".into()),
                expression: "index < 0".into(),
            },
        ]);

        let specific = Tag::new(TagKind::Throws, "if index is negative", "index < 0");
        let other = Tag::new(TagKind::Throws, "if the list is full", "x");
        assert_eq!(truth.expression_for("m()", &specific), Some("index < 0"));
        assert_eq!(truth.expression_for("m()", &other), Some("generic"));
        assert_eq!(
            truth.expression_for("m()", &Tag::new(TagKind::Return, "r", "c")),
            None
        );
    }

    #[test]
    fn expression_equality_ignores_whitespace() {
        assert!(expressions_match("receiver.isEmpty( )", "receiver.isEmpty()"));
        assert!(!expressions_match("receiver.size()", "receiver.isEmpty()"));
    }
}
