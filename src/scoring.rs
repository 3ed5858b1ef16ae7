//! Keyword relevance scoring.
//!
//! A candidate image scores one point for every query keyword that occurs
//! as a substring of its lower-cased title and description. There is no
//! weighting and no positional signal, so ties are common; ranking keeps
//! discovery order among equal scores.

use std::collections::HashSet;

/// Minimum keyword length in characters; shorter tokens are discarded.
const MIN_KEYWORD_CHARS: usize = 3;

/// Stop words removed from keyword sets unless the caller configures others.
///
/// Articles, prepositions and connectives only. Domain vocabulary is never
/// listed here.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "in", "on", "for", "to", "with", "by", "as", "at", "is",
    "are", "this", "that", "these", "those", "from", "into", "about", "over", "under", "between",
    "through", "via",
];

/// A configurable set of words ignored during keyword extraction.
///
/// ```rust
/// # use diagram_lookup::StopWords;
/// let stop = StopWords::default().with_words(["diagram"]);
/// assert!(stop.contains("the"));
/// assert!(stop.contains("Diagram"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Build a stop-word set from arbitrary words (stored lower-cased).
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// An empty set: every token longer than two characters is a keyword.
    pub fn none() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    /// Add more words to the set.
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words.extend(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS)
    }
}

/// Deduplicated, lower-cased keywords extracted from an effective query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Tokenize `query` on whitespace and commas.
    ///
    /// Tokens of two characters or fewer and stop words are dropped;
    /// first-seen order is kept.
    pub fn extract(query: &str, stop_words: &StopWords) -> Self {
        let mut keywords: Vec<String> = Vec::new();
        let lowered = query.to_lowercase();
        for token in lowered.split(|c: char| c.is_whitespace() || c == ',') {
            if token.chars().count() < MIN_KEYWORD_CHARS || stop_words.contains(token) {
                continue;
            }
            if !keywords.iter().any(|k| k == token) {
                keywords.push(token.to_string());
            }
        }
        Self { keywords }
    }

    /// Count the keywords present in `title` or `description`.
    pub fn score(&self, title: &str, description: &str) -> u32 {
        let haystack = format!("{title} {description}").to_lowercase();
        self.keywords
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .count() as u32
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(query: &str) -> Vec<String> {
        KeywordSet::extract(query, &StopWords::default())
            .as_slice()
            .to_vec()
    }

    #[test]
    fn drops_short_tokens_and_stop_words() {
        assert_eq!(
            keywords("The structure of an animal cell"),
            vec!["structure", "animal", "cell"]
        );
    }

    #[test]
    fn splits_on_commas_and_dedups() {
        assert_eq!(
            keywords("Mitochondria, cell structure, mitochondria"),
            vec!["mitochondria", "cell", "structure"]
        );
    }

    #[test]
    fn domain_terms_survive_default_stop_words() {
        assert_eq!(keywords("black holes"), vec!["black", "holes"]);
    }

    #[test]
    fn configured_stop_words_are_removed() {
        let stop = StopWords::default().with_words(["Diagram"]);
        let set = KeywordSet::extract("heart diagram", &stop);
        assert_eq!(set.as_slice(), ["heart"]);
    }

    #[test]
    fn empty_stop_words_keep_every_long_token() {
        let set = KeywordSet::extract("the heart", &StopWords::none());
        assert_eq!(set.as_slice(), ["the", "heart"]);
    }

    #[test]
    fn score_counts_substring_matches() {
        let set = KeywordSet::extract("quadratic equation graph", &StopWords::default());
        assert_eq!(set.score("Quadratic_equation.svg", ""), 2);
        assert_eq!(set.score("Parabola.png", "Graph of a quadratic"), 2);
        assert_eq!(set.score("Cat.jpg", "A cat"), 0);
    }

    #[test]
    fn keyword_matches_inside_longer_words() {
        let set = KeywordSet::extract("cell", &StopWords::default());
        assert_eq!(set.score("Cellular respiration.svg", ""), 1);
    }

    #[test]
    fn empty_keyword_set_scores_zero() {
        let set = KeywordSet::extract("of an", &StopWords::default());
        assert!(set.is_empty());
        assert_eq!(set.score("anything", "of an"), 0);
    }
}
