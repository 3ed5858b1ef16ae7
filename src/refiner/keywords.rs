//! Offline refinement heuristic.
//!
//! Strips question words and filler from the question and keeps the first
//! few meaningful terms. Useful when no text-generation service is
//! configured but raw questions ("what is a mitochondrion?") search poorly.

use async_trait::async_trait;

use super::{QueryRefiner, accept_phrase};

/// Words that never make it into a keyword phrase.
const QUESTION_STOP_WORDS: &[&str] = &[
    "what", "is", "are", "the", "a", "an", "of", "in", "to", "for", "and", "on", "about",
    "explain", "definition", "define", "tell", "me", "do", "we", "by", "with", "how", "this",
    "that", "these", "those", "it", "its", "they", "them", "their", "from", "when", "where", "why",
    "which", "who", "whose", "can", "could", "will", "would", "should", "may", "might", "must",
    "shall", "let", "get", "got", "have", "has", "had",
];

/// Terms padded onto phrases that end up with fewer than two words.
const PADDING_TERMS: &[&str] = &["diagram", "illustration"];

const DEFAULT_MAX_WORDS: usize = 4;

/// Reduce a question to at most `max_words` meaningful lower-case terms.
///
/// ```rust
/// # use diagram_lookup::refiner::keyword_phrase;
/// assert_eq!(
///     keyword_phrase("What is the structure of a mitochondrion?", 4),
///     "structure mitochondrion"
/// );
/// assert_eq!(keyword_phrase("Explain osmosis", 4), "osmosis diagram illustration");
/// ```
pub fn keyword_phrase(question: &str, max_words: usize) -> String {
    let cleaned: String = question
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| w.len() > 2 && !QUESTION_STOP_WORDS.contains(w))
        .take(max_words)
        .collect();

    if words.len() < 2 {
        words.extend_from_slice(PADDING_TERMS);
    }
    words.join(" ")
}

/// Refiner that applies [`keyword_phrase`] locally.
#[derive(Debug, Clone)]
pub struct KeywordRefiner {
    max_words: usize,
}

impl KeywordRefiner {
    pub fn new() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
        }
    }

    /// Cap the number of terms kept from the question (default: 4).
    pub fn max_words(mut self, n: usize) -> Self {
        self.max_words = n.max(1);
        self
    }
}

impl Default for KeywordRefiner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryRefiner for KeywordRefiner {
    fn name(&self) -> &str {
        "keywords"
    }

    async fn refine(&self, question: &str) -> Option<String> {
        accept_phrase(&keyword_phrase(question, self.max_words))
    }
}
