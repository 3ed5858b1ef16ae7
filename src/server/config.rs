//! Configuration loading for diagramd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.diagram-lookup/config.toml` (user)
//! 3. `/etc/diagram-lookup/config.toml` (system)
//!
//! With no file in any location the built-in defaults apply.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::{DiagramAggregator, DiagramLookup};
use crate::cache::CacheConfig;
use crate::refiner::{HttpRefiner, KeywordRefiner, NoRefiner, QueryRefiner};
use crate::repository::CommonsConfig;
use crate::repository::commons::{DEFAULT_BASE_URL, default_user_agent};
use crate::scoring::StopWords;
use crate::{DiagramError, Result};

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub refiner: RefinerConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub ranking: RankingConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:9742).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:9742".to_string()
}

/// Wikimedia Commons client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Client label sent as `User-Agent` (default: `diagram-lookup/<version>`).
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Per-search timeout in seconds (default: 12).
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    #[serde(default = "default_thumb_width")]
    pub thumb_width: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: None,
            timeout_secs: default_search_timeout(),
            search_limit: default_search_limit(),
            thumb_width: default_thumb_width(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_search_timeout() -> u64 {
    12
}

fn default_search_limit() -> u32 {
    50
}

fn default_thumb_width() -> u32 {
    800
}

/// Which refiner to run ahead of searching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefinerKind {
    #[default]
    None,
    Http,
    Keywords,
}

/// Query refinement settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RefinerConfig {
    #[serde(default)]
    pub kind: RefinerKind,
    /// Text-service endpoint; required when `kind = "http"`.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Environment variable holding a bearer token for the endpoint.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Refinement timeout in seconds (default: 7).
    #[serde(default = "default_refine_timeout")]
    pub timeout_secs: u64,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            kind: RefinerKind::None,
            endpoint: None,
            api_key_env: None,
            timeout_secs: default_refine_timeout(),
        }
    }
}

fn default_refine_timeout() -> u64 {
    7
}

/// Result cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Entry lifetime in seconds (default: 6 hours, at most one year).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl() -> u64 {
    6 * 60 * 60
}

fn default_max_entries() -> u64 {
    10_000
}

/// Ranking settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// Images per bundle, 1 to 8 (default: 8).
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Replaces the default stop-word list when present.
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            stop_words: None,
        }
    }
}

fn default_max_results() -> usize {
    8
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.diagram-lookup/config.toml`
    /// 3. `/etc/diagram-lookup/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DiagramError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            DiagramError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(DiagramError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".diagram-lookup").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/diagram-lookup/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    pub fn commons_config(&self) -> CommonsConfig {
        let repo = &self.repository;
        CommonsConfig::new()
            .base_url(&repo.base_url)
            .user_agent(repo.user_agent.clone().unwrap_or_else(default_user_agent))
            .timeout(Duration::from_secs(repo.timeout_secs))
            .search_limit(repo.search_limit)
            .thumb_width(repo.thumb_width)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .ttl(Duration::from_secs(self.cache.ttl_secs))
            .max_entries(self.cache.max_entries)
    }

    /// Instantiate the configured refiner.
    pub fn refiner(&self) -> Result<Arc<dyn QueryRefiner>> {
        let section = &self.refiner;
        let timeout = Duration::from_secs(section.timeout_secs);
        Ok(match section.kind {
            RefinerKind::None => Arc::new(NoRefiner),
            RefinerKind::Keywords => Arc::new(KeywordRefiner::new()),
            RefinerKind::Http => {
                let endpoint = section.endpoint.as_deref().ok_or_else(|| {
                    DiagramError::Configuration(
                        "refiner kind \"http\" requires an endpoint".to_string(),
                    )
                })?;
                let mut refiner = HttpRefiner::new(endpoint)?.timeout(timeout);
                if let Some(token) = section
                    .api_key_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
                {
                    refiner = refiner.bearer_token(token);
                }
                Arc::new(refiner)
            }
        })
    }

    pub fn stop_words(&self) -> StopWords {
        match &self.ranking.stop_words {
            Some(words) => StopWords::new(words),
            None => StopWords::default(),
        }
    }

    /// Build the aggregator this configuration describes.
    pub fn build_aggregator(&self) -> Result<DiagramAggregator> {
        DiagramLookup::builder()
            .commons(self.commons_config())
            .refiner(self.refiner()?)
            .cache_config(self.cache_config())
            .max_results(self.ranking.max_results)
            .refine_timeout(Duration::from_secs(self.refiner.timeout_secs))
            .search_timeout(Duration::from_secs(self.repository.timeout_secs))
            .stop_words(self.stop_words())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.address, "127.0.0.1:9742");
        assert_eq!(config.repository.base_url, "https://commons.wikimedia.org");
        assert_eq!(config.repository.search_limit, 50);
        assert_eq!(config.refiner.kind, RefinerKind::None);
        assert_eq!(config.cache.ttl_secs, 21_600);
        assert_eq!(config.ranking.max_results, 8);
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            address = "0.0.0.0:8080"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "0.0.0.0:8080");
        // Defaults preserved
        assert_eq!(config.repository.timeout_secs, 12);
        assert_eq!(config.refiner.timeout_secs, 7);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            address = "127.0.0.1:9742"

            [repository]
            base_url = "http://localhost:8081"
            user_agent = "classroom-bot/2.0"
            timeout_secs = 5
            search_limit = 20
            thumb_width = 640

            [refiner]
            kind = "http"
            endpoint = "http://localhost:9000/refine"
            timeout_secs = 3

            [cache]
            ttl_secs = 60
            max_entries = 100

            [ranking]
            max_results = 4
            stop_words = ["what", "how"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.repository.search_limit, 20);
        assert_eq!(
            config.repository.user_agent.as_deref(),
            Some("classroom-bot/2.0")
        );
        assert_eq!(config.refiner.kind, RefinerKind::Http);
        assert_eq!(
            config.refiner.endpoint.as_deref(),
            Some("http://localhost:9000/refine")
        );
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.ranking.max_results, 4);

        let commons = config.commons_config();
        assert_eq!(commons.base_url, "http://localhost:8081");
        assert_eq!(commons.timeout, Duration::from_secs(5));
        assert_eq!(commons.thumb_width, 640);

        let stop_words = config.stop_words();
        assert_eq!(stop_words.len(), 2);
        assert!(stop_words.contains("How"));
    }

    #[test]
    fn unknown_refiner_kind_is_rejected() {
        let toml = r#"
            [refiner]
            kind = "oracle"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn http_refiner_requires_endpoint() {
        let config = Config {
            refiner: RefinerConfig {
                kind: RefinerKind::Http,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.refiner().err().unwrap();
        assert!(err.to_string().contains("requires an endpoint"));
    }

    #[test]
    fn configured_refiner_kinds() {
        let mut config = Config::default();
        assert_eq!(config.refiner().unwrap().name(), "none");

        config.refiner.kind = RefinerKind::Keywords;
        assert_eq!(config.refiner().unwrap().name(), "keywords");
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn load_reads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nttl_secs = 30").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.cache.ttl_secs, 30);
        assert_eq!(config.cache_config().ttl, Duration::from_secs(30));
    }

    #[test]
    fn malformed_file_is_a_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache\nttl_secs = ").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, DiagramError::Configuration(_)));
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn oversized_cache_ttl_is_a_configuration_error() {
        let config: Config = toml::from_str("[cache]\nttl_secs = 40000000000").unwrap();
        let err = config.build_aggregator().err().unwrap();
        assert!(matches!(err, DiagramError::Configuration(_)));
    }

    #[test]
    fn max_results_above_eight_is_a_configuration_error() {
        let config: Config = toml::from_str("[ranking]\nmax_results = 20").unwrap();
        let err = config.build_aggregator().err().unwrap();
        assert!(matches!(err, DiagramError::Configuration(_)));
    }

    #[test]
    fn build_aggregator_from_defaults() {
        let aggregator = Config::default().build_aggregator().unwrap();
        assert_eq!(aggregator.config().max_results, 8);
        assert_eq!(aggregator.config().search_timeout, Duration::from_secs(12));
    }
}
