//! Query refinement.
//!
//! A [`QueryRefiner`] turns a free-text question into a short phrase that
//! works better as an image search. Refinement is strictly best-effort:
//! every failure mode (transport error, bad status, unparseable body, a
//! phrase that is too short) collapses to `None`, and the aggregator falls
//! back to the raw question. The aggregator additionally bounds every call
//! with its own timeout, so a refiner that hangs only costs that bound.

mod http;
mod keywords;

pub use http::HttpRefiner;
pub use keywords::{KeywordRefiner, keyword_phrase};

use async_trait::async_trait;

/// Phrases shorter than this (after trimming) are not a usable refinement.
pub const MIN_PHRASE_CHARS: usize = 2;

/// Capability to rewrite a question as an image-search phrase.
#[async_trait]
pub trait QueryRefiner: Send + Sync {
    /// Refiner name for logging/metrics.
    fn name(&self) -> &str;

    /// Return a trimmed, non-empty phrase, or `None` when no refinement is
    /// available. Never fails.
    async fn refine(&self, question: &str) -> Option<String>;
}

/// Trim a proposed phrase and reject it when it is too short to search on.
pub fn accept_phrase(raw: &str) -> Option<String> {
    let phrase = raw.trim();
    (phrase.chars().count() >= MIN_PHRASE_CHARS).then(|| phrase.to_string())
}

/// Refiner that never refines; the raw question is always searched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefiner;

#[async_trait]
impl QueryRefiner for NoRefiner {
    fn name(&self) -> &str {
        "none"
    }

    async fn refine(&self, _question: &str) -> Option<String> {
        None
    }
}
