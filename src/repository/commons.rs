//! Wikimedia Commons search client.
//!
//! Uses the MediaWiki action API with a `search` generator restricted to the
//! File namespace, asking for URL, mime type and extended metadata of each
//! hit. See: <https://commons.wikimedia.org/w/api.php?action=help&modules=query%2Bsearch>

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{MediaRepository, PageRecord};
use crate::{DiagramError, Result};

/// Default base URL for Wikimedia Commons
pub const DEFAULT_BASE_URL: &str = "https://commons.wikimedia.org";

/// Path of the MediaWiki action API below the base URL.
const API_PATH: &str = "/w/api.php";

/// MediaWiki namespace id for File pages.
const FILE_NAMESPACE: &str = "6";

/// Content-type prefilter appended to queries that carry no file-type
/// restriction of their own: raster and vector images only, no PDF/DjVu.
pub const IMAGE_TYPE_RESTRICTION: &str =
    "filetype:bitmap|drawing -filemime:pdf -filemime:application/pdf -filemime:djvu";

static FILE_FILTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:filetype|filemime):").expect("file filter pattern is valid")
});

/// Configuration for [`CommonsClient`].
///
/// ```rust
/// # use diagram_lookup::CommonsConfig;
/// # use std::time::Duration;
/// let config = CommonsConfig::new()
///     .base_url("http://127.0.0.1:8080")
///     .timeout(Duration::from_secs(5));
/// assert_eq!(config.search_limit, 50);
/// ```
#[derive(Debug, Clone)]
pub struct CommonsConfig {
    /// Base URL of the wiki. Default: `https://commons.wikimedia.org`.
    pub base_url: String,
    /// Client label sent as `User-Agent`.
    pub user_agent: String,
    /// Per-request timeout. Default: 12 seconds.
    pub timeout: Duration,
    /// Maximum hits per search (`gsrlimit`). Default: 50.
    pub search_limit: u32,
    /// Requested thumbnail width in pixels (`iiurlwidth`). Default: 800.
    pub thumb_width: u32,
}

impl Default for CommonsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(12),
            search_limit: 50,
            thumb_width: 800,
        }
    }
}

impl CommonsConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn thumb_width(mut self, width: u32) -> Self {
        self.thumb_width = width;
        self
    }
}

/// `diagram-lookup/<version>`
pub fn default_user_agent() -> String {
    format!("diagram-lookup/{}", crate::PKG_VERSION)
}

/// Append [`IMAGE_TYPE_RESTRICTION`] unless the query already restricts
/// file type or mime type itself.
pub fn filtered_search_expression(query: &str) -> String {
    let search = query.trim();
    if FILE_FILTER.is_match(search) {
        search.to_string()
    } else {
        format!("{search} {IMAGE_TYPE_RESTRICTION}")
    }
}

/// Client for the Wikimedia Commons search API.
#[derive(Clone)]
pub struct CommonsClient {
    http: Client,
    config: CommonsConfig,
}

impl CommonsClient {
    /// Create a client from configuration.
    pub fn new(config: CommonsConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                DiagramError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { http, config })
    }

    /// Create a client against a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(CommonsConfig::new().base_url(base_url))
    }

    pub fn config(&self) -> &CommonsConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), API_PATH)
    }

    /// Issue one filtered search and return the page records in rank order.
    #[instrument(name = "commons.search", skip(self), fields(query = %query))]
    pub async fn search_pages(&self, query: &str) -> Result<Vec<PageRecord>> {
        let search = filtered_search_expression(query);
        let limit = self.config.search_limit.to_string();
        let width = self.config.thumb_width.to_string();
        let timeout = self.config.timeout;

        let response = self
            .http
            .get(self.endpoint())
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("origin", "*"),
                ("generator", "search"),
                ("gsrsearch", search.as_str()),
                ("gsrnamespace", FILE_NAMESPACE),
                ("gsrlimit", limit.as_str()),
                ("prop", "imageinfo"),
                ("iiprop", "url|mime|extmetadata"),
                ("iiurlwidth", width.as_str()),
                ("uselang", "en"),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DiagramError::from_reqwest(e, "repository search", timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiagramError::Upstream {
                status: status.as_u16(),
                message: format!("Wikimedia API error: {status}"),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DiagramError::from_reqwest(e, "repository search", timeout))?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;

        if let Some(err) = parsed.error {
            return Err(DiagramError::Upstream {
                status: status.as_u16(),
                message: format!("Wikimedia API error {}: {}", err.code, err.info),
            });
        }

        let pages = parsed
            .query
            .map(|q| q.pages.into_ranked())
            .unwrap_or_default();
        debug!(hits = pages.len(), "commons search complete");
        Ok(pages)
    }
}

#[async_trait]
impl MediaRepository for CommonsClient {
    fn name(&self) -> &str {
        "wikimedia-commons"
    }

    async fn search(&self, query: &str) -> Result<Vec<PageRecord>> {
        self.search_pages(query).await
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<QueryBlock>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBlock {
    #[serde(default)]
    pages: Pages,
}

/// `formatversion=1` keys pages by id; `formatversion=2` returns a list.
///
/// Pages are held as raw JSON so one malformed hit is dropped on its own
/// instead of failing the whole reply.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Pages {
    Keyed(HashMap<String, Value>),
    Listed(Vec<Value>),
}

impl Default for Pages {
    fn default() -> Self {
        Pages::Listed(Vec::new())
    }
}

impl Pages {
    /// Decode each page, skipping malformed ones, and order by search
    /// rank, then page id, so map-shaped replies are deterministic.
    fn into_ranked(self) -> Vec<PageRecord> {
        let raw: Vec<Value> = match self {
            Pages::Keyed(map) => map.into_values().collect(),
            Pages::Listed(list) => list,
        };
        let mut pages: Vec<PageRecord> = raw
            .into_iter()
            .filter_map(|page| match serde_json::from_value::<PageRecord>(page) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(error = %e, "skipping malformed page record");
                    None
                }
            })
            .collect();
        pages.sort_by_key(|p| (p.index.unwrap_or(u32::MAX), p.pageid.unwrap_or(u64::MAX)));
        pages
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}
