//! Image results and ranking candidates

use serde::{Deserialize, Serialize};

/// Author recorded when a repository record carries no attribution.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// License recorded when a repository record carries no license field.
pub const UNKNOWN_LICENSE: &str = "Unknown license";

/// One illustrative image found in the media repository.
///
/// Two results are the same image when their `full_url` matches exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    /// Record title without the `File:` namespace prefix.
    pub title: String,
    pub thumb_url: String,
    pub full_url: String,
    /// Always starts with `image/`.
    pub mime: String,
    pub author: String,
    pub license: String,
    pub license_url: String,
}

/// An accepted image paired with its keyword relevance score.
///
/// Only lives for the duration of one aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub image: ImageResult,
    pub score: u32,
}

impl Candidate {
    pub fn new(image: ImageResult, score: u32) -> Self {
        Self { image, score }
    }
}
