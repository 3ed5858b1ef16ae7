//! The lookup pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};

use super::ranking::SearchPass;
use crate::cache::{BundleCache, CacheKey, Clock};
use crate::query::{candidate_queries, fallback_query};
use crate::refiner::{QueryRefiner, accept_phrase};
use crate::repository::MediaRepository;
use crate::scoring::{KeywordSet, StopWords};
use crate::telemetry;
use crate::types::ResultBundle;
use crate::{DiagramError, Result};

/// Terms OR-ed onto the effective query for the fallback search.
pub const DEFAULT_FALLBACK_TERMS: &[&str] = &["diagram", "schematic", "illustration"];

/// Tuning for [`DiagramAggregator`].
///
/// ```rust
/// # use diagram_lookup::AggregatorConfig;
/// # use std::time::Duration;
/// let config = AggregatorConfig::new()
///     .max_results(5)
///     .refine_timeout(Duration::from_secs(3));
/// assert_eq!(config.max_results, 5);
/// ```
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Upper bound on images per bundle; also the early-stop threshold of
    /// the primary pass. Default: 8.
    pub max_results: usize,
    /// Bound on one refinement call. Default: 7 seconds.
    pub refine_timeout: Duration,
    /// Bound on one repository search. Default: 12 seconds.
    pub search_timeout: Duration,
    /// Terms for the diagram-biased fallback search.
    pub fallback_terms: Vec<String>,
    /// Words ignored when extracting scoring keywords.
    pub stop_words: StopWords,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_results: 8,
            refine_timeout: Duration::from_secs(7),
            search_timeout: Duration::from_secs(12),
            fallback_terms: DEFAULT_FALLBACK_TERMS.iter().map(|t| t.to_string()).collect(),
            stop_words: StopWords::default(),
        }
    }
}

impl AggregatorConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    pub fn refine_timeout(mut self, timeout: Duration) -> Self {
        self.refine_timeout = timeout;
        self
    }

    pub fn search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    pub fn fallback_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }
}

/// Turns a free-text question into a ranked bundle of diagrams.
///
/// Built via [`DiagramLookup::builder()`](super::DiagramLookup::builder).
/// Every lookup runs sequentially: cache check, refinement, candidate
/// searches in order, at most one fallback search, ranking, cache store.
pub struct DiagramAggregator {
    repository: Arc<dyn MediaRepository>,
    refiner: Arc<dyn QueryRefiner>,
    cache: Arc<dyn BundleCache>,
    clock: Arc<dyn Clock>,
    config: AggregatorConfig,
}

impl DiagramAggregator {
    pub(crate) fn new(
        repository: Arc<dyn MediaRepository>,
        refiner: Arc<dyn QueryRefiner>,
        cache: Arc<dyn BundleCache>,
        clock: Arc<dyn Clock>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            repository,
            refiner,
            cache,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Look up diagrams for `query`.
    ///
    /// A blank query is an [`InvalidInput`](DiagramError::InvalidInput)
    /// error. An empty image list is a successful result and is cached like
    /// any other. [`AggregationFailed`](DiagramError::AggregationFailed) is
    /// returned only when every search attempted for the lookup failed; in
    /// that case nothing is cached.
    #[instrument(name = "aggregator.lookup", skip(self), fields(query = %query))]
    pub async fn lookup(&self, query: &str) -> Result<ResultBundle> {
        let question = query.trim();
        if question.is_empty() {
            return Err(DiagramError::InvalidInput(
                "query parameter must not be empty".to_string(),
            ));
        }

        let started = Instant::now();
        let key = CacheKey::from_query(question);

        if let Some(bundle) = self.cache.get(&key).await {
            debug!(%key, images = bundle.total, "serving cached bundle");
            record_lookup("hit", started);
            return Ok(bundle);
        }

        match self.aggregate(question).await {
            Ok(bundle) => {
                self.cache.insert(key, bundle.clone()).await;
                info!(images = bundle.total, "diagram lookup complete");
                record_lookup("ok", started);
                Ok(bundle)
            }
            Err(e) => {
                error!(error = %e, "diagram lookup failed");
                record_lookup("error", started);
                Err(e)
            }
        }
    }

    async fn aggregate(&self, question: &str) -> Result<ResultBundle> {
        let effective = self.effective_query(question).await;
        let keywords = KeywordSet::extract(&effective, &self.config.stop_words);
        let mut pass = SearchPass::new(&keywords);

        for candidate in candidate_queries(&effective) {
            if pass.accepted() >= self.config.max_results {
                debug!(accepted = pass.accepted(), "enough images, skipping remaining candidates");
                break;
            }
            self.search_into(&candidate, &mut pass).await;
        }

        if pass.accepted() == 0 {
            let expanded = fallback_query(&effective, &self.config.fallback_terms);
            info!(%expanded, "no images after primary pass, retrying with diagram-biased query");
            metrics::counter!(telemetry::FALLBACK_PASSES_TOTAL).increment(1);
            self.search_into(&expanded, &mut pass).await;
        }

        let images = pass.finish(question, self.config.max_results)?;
        Ok(ResultBundle::new(question, images, self.clock.now()))
    }

    /// The refined phrase when one is available in time, else the question.
    async fn effective_query(&self, question: &str) -> String {
        let refiner = self.refiner.name().to_owned();
        let outcome =
            tokio::time::timeout(self.config.refine_timeout, self.refiner.refine(question)).await;

        let label = match outcome {
            Ok(Some(raw)) => {
                if let Some(phrase) = accept_phrase(&raw) {
                    info!(%refiner, refined = %phrase, "using refined image query");
                    metrics::counter!(telemetry::REFINEMENTS_TOTAL, "outcome" => "refined")
                        .increment(1);
                    return phrase;
                }
                "none"
            }
            Ok(None) => "none",
            Err(_) => {
                warn!(
                    %refiner,
                    timeout_ms = self.config.refine_timeout.as_millis() as u64,
                    "query refinement timed out"
                );
                "timeout"
            }
        };
        metrics::counter!(telemetry::REFINEMENTS_TOTAL, "outcome" => label).increment(1);
        question.to_string()
    }

    /// Run one repository search and fold its outcome into `pass`.
    ///
    /// Failures are logged and recorded, never propagated: one failing
    /// candidate must not stop the others.
    async fn search_into(&self, query: &str, pass: &mut SearchPass<'_>) {
        let repository = self.repository.name().to_owned();
        let timeout = self.config.search_timeout;
        let outcome = tokio::time::timeout(timeout, self.repository.search(query))
            .await
            .unwrap_or_else(|_| {
                Err(DiagramError::UpstreamTimeout {
                    operation: "repository search",
                    after: timeout,
                })
            });

        match outcome {
            Ok(records) => {
                let accepted = pass.absorb(&records);
                metrics::counter!(
                    telemetry::UPSTREAM_REQUESTS_TOTAL,
                    "repository" => repository,
                    "status" => "ok"
                )
                .increment(1);
                debug!(candidate = query, records = records.len(), accepted, "search complete");
            }
            Err(e) => {
                let status = match e {
                    DiagramError::UpstreamTimeout { .. } => "timeout",
                    _ => "error",
                };
                metrics::counter!(
                    telemetry::UPSTREAM_REQUESTS_TOTAL,
                    "repository" => repository,
                    "status" => status
                )
                .increment(1);
                warn!(candidate = query, error = %e, "repository search failed, skipping candidate");
                pass.record_failure(e);
            }
        }
    }
}

fn record_lookup(outcome: &'static str, started: Instant) {
    metrics::counter!(telemetry::LOOKUPS_TOTAL, "outcome" => outcome).increment(1);
    metrics::histogram!(telemetry::LOOKUP_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
}
