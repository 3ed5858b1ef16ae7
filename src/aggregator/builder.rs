//! Builder for configuring aggregator instances

use std::sync::Arc;
use std::time::Duration;

use super::engine::{AggregatorConfig, DiagramAggregator};
use crate::cache::{BundleCache, CacheConfig, Clock, InMemoryBundleCache, MAX_TTL, SystemClock};
use crate::refiner::{NoRefiner, QueryRefiner};
use crate::repository::{CommonsClient, CommonsConfig, MediaRepository};
use crate::scoring::StopWords;
use crate::{DiagramError, Result};

/// Most images a bundle may carry.
pub const MAX_RESULTS_LIMIT: usize = 8;

/// Main entry point for creating aggregator instances.
pub struct DiagramLookup;

impl DiagramLookup {
    /// Create a new builder for configuring the aggregator.
    pub fn builder() -> DiagramLookupBuilder {
        DiagramLookupBuilder::new()
    }
}

/// Builder for configuring aggregator instances.
///
/// A repository is mandatory: either [`commons()`](Self::commons) or an
/// explicit [`repository()`](Self::repository). Everything else defaults:
/// no refinement, an in-memory cache with a 6-hour TTL, the system clock.
pub struct DiagramLookupBuilder {
    repository: Option<Arc<dyn MediaRepository>>,
    commons: Option<CommonsConfig>,
    refiner: Option<Arc<dyn QueryRefiner>>,
    cache: Option<Arc<dyn BundleCache>>,
    cache_config: CacheConfig,
    clock: Option<Arc<dyn Clock>>,
    config: AggregatorConfig,
}

impl DiagramLookupBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            commons: None,
            refiner: None,
            cache: None,
            cache_config: CacheConfig::default(),
            clock: None,
            config: AggregatorConfig::default(),
        }
    }

    /// Search Wikimedia Commons with the given client configuration.
    pub fn commons(mut self, config: CommonsConfig) -> Self {
        self.commons = Some(config);
        self
    }

    /// Search a custom repository. Takes precedence over [`commons()`](Self::commons).
    pub fn repository(mut self, repository: Arc<dyn MediaRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Refine questions before searching (default: no refinement).
    pub fn refiner(mut self, refiner: Arc<dyn QueryRefiner>) -> Self {
        self.refiner = Some(refiner);
        self
    }

    /// Use a custom cache backend. [`cache_config()`](Self::cache_config)
    /// is ignored when this is set.
    pub fn cache(mut self, cache: Arc<dyn BundleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Configure the default in-memory cache.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Clock for bundle timestamps and, with the default cache, freshness.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the whole aggregator configuration.
    pub fn config(mut self, config: AggregatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_results(mut self, n: usize) -> Self {
        self.config.max_results = n;
        self
    }

    pub fn refine_timeout(mut self, timeout: Duration) -> Self {
        self.config.refine_timeout = timeout;
        self
    }

    pub fn search_timeout(mut self, timeout: Duration) -> Self {
        self.config.search_timeout = timeout;
        self
    }

    pub fn stop_words(mut self, stop_words: StopWords) -> Self {
        self.config.stop_words = stop_words;
        self
    }

    /// Build the aggregator.
    ///
    /// Fails with [`DiagramError::Configuration`] when `max_results` is
    /// outside `1..=8`, when the default cache would get a TTL longer than
    /// [`MAX_TTL`], or when no repository is configured.
    pub fn build(self) -> Result<DiagramAggregator> {
        if !(1..=MAX_RESULTS_LIMIT).contains(&self.config.max_results) {
            return Err(DiagramError::Configuration(format!(
                "max_results must be between 1 and {MAX_RESULTS_LIMIT}, got {}",
                self.config.max_results
            )));
        }
        if self.cache.is_none() && self.cache_config.ttl > MAX_TTL {
            return Err(DiagramError::Configuration(format!(
                "cache ttl must not exceed {} seconds, got {}",
                MAX_TTL.as_secs(),
                self.cache_config.ttl.as_secs()
            )));
        }

        let repository: Arc<dyn MediaRepository> = match (self.repository, self.commons) {
            (Some(repository), _) => repository,
            (None, Some(config)) => Arc::new(CommonsClient::new(config)?),
            (None, None) => {
                return Err(DiagramError::Configuration(
                    "no media repository configured".to_string(),
                ));
            }
        };

        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let cache: Arc<dyn BundleCache> = match self.cache {
            Some(cache) => cache,
            None => Arc::new(InMemoryBundleCache::with_clock(
                &self.cache_config,
                clock.clone(),
            )),
        };
        let refiner: Arc<dyn QueryRefiner> = self.refiner.unwrap_or_else(|| Arc::new(NoRefiner));

        Ok(DiagramAggregator::new(
            repository,
            refiner,
            cache,
            clock,
            self.config,
        ))
    }
}

impl Default for DiagramLookupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_repository_fails() {
        let err = DiagramLookup::builder().build().err().unwrap();
        assert!(err.to_string().contains("no media repository"));
    }

    #[test]
    fn zero_max_results_is_rejected() {
        let err = DiagramLookup::builder()
            .commons(CommonsConfig::default())
            .max_results(0)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, DiagramError::Configuration(_)));
    }

    #[test]
    fn max_results_above_eight_is_rejected() {
        let err = DiagramLookup::builder()
            .commons(CommonsConfig::default())
            .max_results(9)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, DiagramError::Configuration(_)));
        assert!(err.to_string().contains("between 1 and 8"));
    }

    #[test]
    fn oversized_cache_ttl_is_rejected() {
        let err = DiagramLookup::builder()
            .commons(CommonsConfig::default())
            .cache_config(CacheConfig::new().ttl(Duration::from_secs(40_000_000_000)))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, DiagramError::Configuration(_)));
        assert!(err.to_string().contains("cache ttl"));
    }

    #[test]
    fn commons_builds_with_defaults() {
        let aggregator = DiagramLookup::builder()
            .commons(CommonsConfig::default())
            .build()
            .unwrap();
        assert_eq!(aggregator.config().max_results, 8);
        assert_eq!(aggregator.config().refine_timeout, Duration::from_secs(7));
    }
}
