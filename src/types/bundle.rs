//! Result bundles returned by a lookup

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::image::ImageResult;

/// Ranked outcome of one aggregation.
///
/// This is both the unit stored in the result cache and the body of a
/// successful HTTP response. `images` is in rank order and that order is
/// preserved through caching and serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBundle {
    /// The caller's question, trimmed.
    pub query: String,
    pub images: Vec<ImageResult>,
    pub total: usize,
    pub generated_at: DateTime<Utc>,
}

impl ResultBundle {
    /// Build a bundle, deriving `total` from the image list.
    pub fn new(
        query: impl Into<String>,
        images: Vec<ImageResult>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            query: query.into(),
            total: images.len(),
            images,
            generated_at,
        }
    }

    /// Whether the lookup found nothing. Still a successful result.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn total_tracks_image_count() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let bundle = ResultBundle::new("photosynthesis", Vec::new(), at);
        assert_eq!(bundle.total, 0);
        assert!(bundle.is_empty());
    }

    #[test]
    fn serializes_generated_at_as_rfc3339() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let bundle = ResultBundle::new("photosynthesis", Vec::new(), at);
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["query"], "photosynthesis");
        assert_eq!(json["total"], 0);
        assert_eq!(json["generatedAt"], "2024-05-01T12:00:00Z");
    }
}
