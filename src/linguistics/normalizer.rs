//! Comment normalization: raw tag comment to a [`WordSet`].

use crate::core::config::MatchConfig;
use crate::core::model::{DocumentedMethod, Tag, WordSet};

use super::lemmatizer::{apply_lemmas, LanguageTools};
use super::stopwords::StopwordFilter;

/// Keep only `[A-Za-z0-9! ]`.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '!' || *c == ' ')
        .collect()
}

/// Turns tag comments into cleaned, lemmatized, stopword-filtered word sets.
pub struct CommentNormalizer<'a> {
    tools: &'a dyn LanguageTools,
}

impl<'a> CommentNormalizer<'a> {
    /// Create a normalizer backed by the given linguistic tools.
    pub fn new(tools: &'a dyn LanguageTools) -> Self {
        Self { tools }
    }

    /// Lemmatized tokens of `tag`'s comment, positions preserved and
    /// stopwords blanked (when enabled).
    pub fn tokens(&self, tag: &Tag, method: &DocumentedMethod, config: &MatchConfig) -> Vec<String> {
        let comment = if config.pos_select {
            self.tools.subject_predicate(&tag.comment, method)
        } else {
            tag.comment.clone()
        };
        let comment = strip_punctuation(&comment);

        let mut tokens: Vec<String> = comment.split(' ').map(str::to_string).collect();
        let lemmas = self.tools.lemmatize(&comment);
        apply_lemmas(&mut tokens, &lemmas, &comment);

        if config.stopwords_removal {
            StopwordFilter::new(config.class_simple_name()).blank(&mut tokens);
        }
        tokens
    }

    /// Normalized word set for `tag`'s comment.
    pub fn normalize(&self, tag: &Tag, method: &DocumentedMethod, config: &MatchConfig) -> WordSet {
        self.tokens(tag, method, config).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::TagKind;
    use crate::linguistics::lemmatizer::RuleLemmatizer;

    fn method() -> DocumentedMethod {
        DocumentedMethod::new("java.util.ArrayList.isEmpty()")
    }

    #[test]
    fn strips_everything_outside_allowed_set() {
        assert_eq!(strip_punctuation("{@code true} if empty!"), "code true if empty!");
        assert_eq!(strip_punctuation("a-b_c.d\te"), "abcde");
    }

    #[test]
    fn normalize_lemmatizes_and_removes_stopwords() {
        let tools = RuleLemmatizer::new();
        let normalizer = CommentNormalizer::new(&tools);
        let tag = Tag::new(TagKind::Return, "returns true if the list is empty", "x");

        let words = normalizer.normalize(&tag, &method(), &MatchConfig::for_class("ArrayList"));
        assert_eq!(words.joined(), "return list empty");
    }

    #[test]
    fn class_simple_name_is_a_stopword() {
        let tools = RuleLemmatizer::new();
        let normalizer = CommentNormalizer::new(&tools);
        let tag = Tag::new(TagKind::Return, "true if this ArrayList is empty", "x");

        let words = normalizer.normalize(
            &tag,
            &method(),
            &MatchConfig::for_class("java.util.ArrayList"),
        );
        assert!(!words.contains("arraylist"));
        assert_eq!(words.joined(), "empty");
    }

    #[test]
    fn stopwords_kept_when_removal_disabled() {
        let tools = RuleLemmatizer::new();
        let normalizer = CommentNormalizer::new(&tools);
        let tag = Tag::new(TagKind::Return, "true if empty", "x");
        let config = MatchConfig::for_class("ArrayList").with_stopwords_removal(false);

        let words = normalizer.normalize(&tag, &method(), &config);
        assert_eq!(words.joined(), "true if empty");
    }

    #[test]
    fn double_spaces_never_produce_empty_words() {
        let tools = RuleLemmatizer::new();
        let normalizer = CommentNormalizer::new(&tools);
        let tag = Tag::new(TagKind::Return, "returns  the   size", "x");

        let words = normalizer.normalize(&tag, &method(), &MatchConfig::for_class("ArrayList"));
        assert!(!words.contains(""));
        assert!(words.contains("return"));
    }

    #[test]
    fn pos_select_narrows_to_condition_clause() {
        let tools = RuleLemmatizer::new();
        let normalizer = CommentNormalizer::new(&tools);
        let tag = Tag::new(TagKind::Throws, "NullPointerException if the key is null", "x");
        let mut config = MatchConfig::for_class("HashMap");
        config.pos_select = true;

        let words = normalizer.normalize(&tag, &method(), &config);
        assert_eq!(words.joined(), "key null");
    }
}
