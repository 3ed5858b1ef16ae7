//! In-memory result cache.
//!
//! [`InMemoryBundleCache`] keeps one [`CacheEntry`] per normalized query in a
//! moka cache owned by the aggregator. Freshness is judged against an
//! injected [`Clock`], not moka's internal timer, so TTL behaviour can be
//! driven deterministically; moka's own `time_to_live` is set to the same
//! TTL as a backstop against unbounded retention.
//!
//! # Expiry
//!
//! There is no background sweeper. Every [`get`](BundleCache::get) first
//! purges all entries whose age has reached the TTL, then looks up the key.
//! An entry is used only while `now - stored_at < ttl`.
//!
//! # Concurrency
//!
//! Entries are replaced wholesale, never mutated, so last-writer-wins is
//! all the coordination needed. Two concurrent misses for the same key both
//! run the full pipeline and both store; the later store wins.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use tracing::debug;

use super::{BundleCache, CacheKey, Clock, SystemClock};
use crate::telemetry;
use crate::types::ResultBundle;

/// Longest freshness window a cache accepts: one year.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Configuration for the result cache.
///
/// ```rust
/// # use diagram_lookup::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(500)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached bundles. Default: 10,000.
    pub max_entries: u64,
    /// Freshness window for a stored bundle. Default: 6 hours.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(6 * 3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached bundles.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the freshness window.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// A stored bundle and the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub bundle: ResultBundle,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry is still usable at `now`.
    ///
    /// A `stored_at` in the future (clock stepped backwards) counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (now - self.stored_at).to_std() {
            Ok(age) => age < ttl,
            Err(_) => true,
        }
    }
}

/// Process-local [`BundleCache`] backed by moka.
pub struct InMemoryBundleCache {
    entries: Cache<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryBundleCache {
    /// Create a cache on the system clock.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache that judges freshness with `clock`.
    ///
    /// moka's backstop TTL is capped at [`MAX_TTL`]; freshness itself still
    /// uses the configured TTL.
    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl.min(MAX_TTL))
            .build();
        Self {
            entries,
            ttl: config.ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Remove every entry whose age has reached the TTL.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let expired: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh(now, self.ttl))
            .map(|(key, _)| key)
            .collect();
        for key in &expired {
            self.entries.invalidate(key.as_str()).await;
        }
        if !expired.is_empty() {
            debug!(purged = expired.len(), "purged expired result bundles");
        }
        expired.len()
    }

    /// Number of entries currently held, expired-but-unpurged included.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BundleCache for InMemoryBundleCache {
    async fn get(&self, key: &CacheKey) -> Option<ResultBundle> {
        self.purge_expired().await;
        let now = self.clock.now();
        match self.entries.get(key.as_str()).await {
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(entry.bundle)
            }
            _ => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    async fn insert(&self, key: CacheKey, bundle: ResultBundle) {
        let entry = CacheEntry {
            bundle,
            stored_at: self.clock.now(),
        };
        self.entries.insert(key.into_string(), entry).await;
    }
}
