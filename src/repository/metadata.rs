//! Attribution and license extraction from Commons `extmetadata` blocks.
//!
//! Commons stores every field as `{ "value": ..., "source": ... }`. Values are
//! usually strings but occasionally numbers, and a record with no metadata
//! may carry `[]` instead of an object. Anything that isn't usable text is
//! treated as absent.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{UNKNOWN_AUTHOR, UNKNOWN_LICENSE};

/// Author fields, in precedence order.
const AUTHOR_FIELDS: &[&str] = &["Artist", "Author", "Creator"];

/// License fields, in precedence order.
const LICENSE_FIELDS: &[&str] = &["License", "Copyright"];

/// License URL fields. `LicenseUrl` is what Commons emits; `License_url`
/// appears in older mirrors.
const LICENSE_URL_FIELDS: &[&str] = &["LicenseUrl", "License_url"];

/// Extended metadata attached to a Commons image record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ExtMetadata(Value);

impl ExtMetadata {
    /// Wrap a raw `extmetadata` JSON value.
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// Text of a single field, trimmed; `None` when missing or empty.
    pub fn field(&self, name: &str) -> Option<String> {
        let entry = self.0.get(name)?;
        let value = match entry {
            Value::Object(_) => entry.get("value")?,
            other => other,
        };
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// First non-empty field among `names`.
    fn first_of(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.field(name))
    }

    /// Free-text description used for relevance scoring.
    pub fn description(&self) -> String {
        self.field("ImageDescription").unwrap_or_default()
    }
}

/// Normalized attribution for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub author: String,
    pub license: String,
    pub license_url: String,
}

/// Map an `extmetadata` block to a fixed attribution shape.
///
/// Author: `Artist`, else `Author`, else `Creator`, else `"Unknown"`.
/// License: `License`, else `Copyright`, else `"Unknown license"`.
/// License URL: `LicenseUrl`, else empty.
pub fn extract_attribution(meta: &ExtMetadata) -> Attribution {
    Attribution {
        author: meta
            .first_of(AUTHOR_FIELDS)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        license: meta
            .first_of(LICENSE_FIELDS)
            .unwrap_or_else(|| UNKNOWN_LICENSE.to_string()),
        license_url: meta.first_of(LICENSE_URL_FIELDS).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(raw: Value) -> ExtMetadata {
        ExtMetadata::new(raw)
    }

    #[test]
    fn artist_wins_over_author_and_creator() {
        let m = meta(json!({
            "Artist": { "value": "Jane Doe" },
            "Author": { "value": "Someone Else" },
            "Creator": { "value": "Third" },
        }));
        assert_eq!(extract_attribution(&m).author, "Jane Doe");
    }

    #[test]
    fn falls_through_to_creator() {
        let m = meta(json!({ "Creator": { "value": "Lab" } }));
        assert_eq!(extract_attribution(&m).author, "Lab");
    }

    #[test]
    fn empty_values_count_as_absent() {
        let m = meta(json!({
            "Artist": { "value": "  " },
            "Author": { "value": "Fallback" },
            "License": { "value": "" },
            "Copyright": { "value": "pd" },
        }));
        let a = extract_attribution(&m);
        assert_eq!(a.author, "Fallback");
        assert_eq!(a.license, "pd");
    }

    #[test]
    fn defaults_when_metadata_missing() {
        let a = extract_attribution(&ExtMetadata::default());
        assert_eq!(a.author, UNKNOWN_AUTHOR);
        assert_eq!(a.license, UNKNOWN_LICENSE);
        assert_eq!(a.license_url, "");
    }

    #[test]
    fn tolerates_array_shaped_metadata() {
        let a = extract_attribution(&meta(json!([])));
        assert_eq!(a.author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn license_url_accepts_both_spellings() {
        let current = meta(json!({ "LicenseUrl": { "value": "https://cc.org/by/4.0" } }));
        let legacy = meta(json!({ "License_url": { "value": "https://cc.org/by-sa/3.0" } }));
        assert_eq!(extract_attribution(&current).license_url, "https://cc.org/by/4.0");
        assert_eq!(extract_attribution(&legacy).license_url, "https://cc.org/by-sa/3.0");
    }

    #[test]
    fn numeric_values_render_as_text() {
        let m = meta(json!({ "Copyright": { "value": 1923 } }));
        assert_eq!(extract_attribution(&m).license, "1923");
    }

    #[test]
    fn null_and_object_values_are_ignored() {
        let m = meta(json!({
            "Artist": { "value": null },
            "Author": { "value": { "nested": true } },
        }));
        assert_eq!(extract_attribution(&m).author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn description_defaults_to_empty() {
        assert_eq!(ExtMetadata::default().description(), "");
        let m = meta(json!({ "ImageDescription": { "value": "Cross-section of a leaf" } }));
        assert_eq!(m.description(), "Cross-section of a leaf");
    }
}
