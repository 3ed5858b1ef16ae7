//! Media repository access.
//!
//! [`MediaRepository`] is the seam between the aggregator and the external
//! media search service. The production implementation is
//! [`CommonsClient`], which speaks the MediaWiki action API exposed by
//! Wikimedia Commons.
//!
//! Repositories return raw [`PageRecord`]s; turning those into
//! [`ImageResult`]s (mime filtering, title cleanup, attribution) happens in
//! [`PageRecord::to_image()`] so every implementation shares one filter.
//!
//! # Failure semantics
//!
//! A repository does not retry. Timeouts surface as
//! [`DiagramError::UpstreamTimeout`](crate::DiagramError::UpstreamTimeout),
//! non-success statuses as [`DiagramError::Upstream`](crate::DiagramError::Upstream).
//! Trying another formulation is the aggregator's job.

pub mod commons;
pub mod metadata;

pub use commons::{CommonsClient, CommonsConfig};
pub use metadata::{Attribution, ExtMetadata, extract_attribution};

use async_trait::async_trait;
use serde::Deserialize;

use crate::Result;
use crate::types::ImageResult;

/// Namespace prefix Commons puts on file titles.
const FILE_NAMESPACE_PREFIX: &str = "File:";

/// Mime prefix a record must carry to count as an image.
const IMAGE_MIME_PREFIX: &str = "image/";

/// A searchable store of media files.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Repository name for logging/metrics.
    fn name(&self) -> &str;

    /// Run one search and return the raw records in rank order.
    async fn search(&self, query: &str) -> Result<Vec<PageRecord>>;
}

/// One page hit from a repository search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageRecord {
    #[serde(default)]
    pub pageid: Option<u64>,
    /// Position in the search ranking (1-based), when the repository reports it.
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub imageinfo: Vec<ImageInfo>,
}

/// File details attached to a page record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumburl: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub extmetadata: ExtMetadata,
}

impl PageRecord {
    /// The first (current) file revision, if any.
    pub fn image_info(&self) -> Option<&ImageInfo> {
        self.imageinfo.first()
    }

    /// Title with the `File:` namespace prefix removed.
    pub fn display_title(&self) -> &str {
        self.title
            .strip_prefix(FILE_NAMESPACE_PREFIX)
            .unwrap_or(&self.title)
    }

    /// Description text for relevance scoring; empty when absent.
    pub fn description(&self) -> String {
        self.image_info()
            .map(|info| info.extmetadata.description())
            .unwrap_or_default()
    }

    /// Convert to an image result.
    ///
    /// Returns `None` for records without file info, without a file URL, or
    /// whose mime type does not start with `image/`.
    pub fn to_image(&self) -> Option<ImageResult> {
        let info = self.image_info()?;
        let mime = info.mime.as_deref().unwrap_or_default();
        if !mime.starts_with(IMAGE_MIME_PREFIX) {
            return None;
        }
        let full_url = info.url.as_deref().filter(|u| !u.is_empty())?;
        let thumb_url = info
            .thumburl
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(full_url);
        let attribution = extract_attribution(&info.extmetadata);

        Some(ImageResult {
            title: self.display_title().to_string(),
            thumb_url: thumb_url.to_string(),
            full_url: full_url.to_string(),
            mime: mime.to_string(),
            author: attribution.author,
            license: attribution.license,
            license_url: attribution.license_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> PageRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn image_record_converts() {
        let r = record(json!({
            "pageid": 7,
            "index": 1,
            "title": "File:Heart diagram-en.svg",
            "imageinfo": [{
                "url": "https://upload.example/Heart.svg",
                "thumburl": "https://upload.example/800px-Heart.png",
                "mime": "image/svg+xml",
                "extmetadata": {
                    "Artist": { "value": "Wapcaplet" },
                    "LicenseShortName": { "value": "CC BY-SA 3.0" },
                    "License": { "value": "cc-by-sa-3.0" }
                }
            }]
        }));
        let image = r.to_image().unwrap();
        assert_eq!(image.title, "Heart diagram-en.svg");
        assert_eq!(image.full_url, "https://upload.example/Heart.svg");
        assert_eq!(image.thumb_url, "https://upload.example/800px-Heart.png");
        assert_eq!(image.author, "Wapcaplet");
        assert_eq!(image.license, "cc-by-sa-3.0");
    }

    #[test]
    fn non_image_mime_is_rejected() {
        let r = record(json!({
            "title": "File:Lecture.pdf",
            "imageinfo": [{ "url": "https://upload.example/Lecture.pdf", "mime": "application/pdf" }]
        }));
        assert!(r.to_image().is_none());
    }

    #[test]
    fn missing_mime_or_url_is_rejected() {
        let no_mime = record(json!({
            "title": "File:A.png",
            "imageinfo": [{ "url": "https://upload.example/A.png" }]
        }));
        let no_url = record(json!({
            "title": "File:B.png",
            "imageinfo": [{ "mime": "image/png" }]
        }));
        let no_info = record(json!({ "title": "File:C.png" }));
        assert!(no_mime.to_image().is_none());
        assert!(no_url.to_image().is_none());
        assert!(no_info.to_image().is_none());
    }

    #[test]
    fn thumb_falls_back_to_full_url() {
        let r = record(json!({
            "title": "File:A.png",
            "imageinfo": [{ "url": "https://upload.example/A.png", "mime": "image/png" }]
        }));
        assert_eq!(r.to_image().unwrap().thumb_url, "https://upload.example/A.png");
    }

    #[test]
    fn title_without_namespace_is_kept() {
        let r = record(json!({ "title": "Plain title" }));
        assert_eq!(r.display_title(), "Plain title");
    }
}
