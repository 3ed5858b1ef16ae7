//! Result caching.
//!
//! The aggregator talks to its cache through [`BundleCache`], so the
//! process-local [`InMemoryBundleCache`] can be swapped for a shared
//! backend (e.g. redis) without touching orchestration:
//!
//! ```rust,ignore
//! struct RedisBundleCache { /* ... */ }
//!
//! #[async_trait]
//! impl BundleCache for RedisBundleCache {
//!     async fn get(&self, key: &CacheKey) -> Option<ResultBundle> { /* GET + decode */ }
//!     async fn insert(&self, key: CacheKey, bundle: ResultBundle) { /* SET EX ttl */ }
//! }
//! ```
//!
//! Keys are normalized queries under a version namespace (see
//! [`CacheKey`]), which is backend-agnostic.

mod clock;
mod memory;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::{CacheConfig, CacheEntry, InMemoryBundleCache, MAX_TTL};

use std::fmt;

use async_trait::async_trait;

use crate::types::ResultBundle;

/// Storage for previously computed result bundles.
#[async_trait]
pub trait BundleCache: Send + Sync {
    /// Fetch a live bundle. Expired entries are never returned.
    async fn get(&self, key: &CacheKey) -> Option<ResultBundle>;

    /// Store `bundle`, replacing any previous entry for `key`.
    async fn insert(&self, key: CacheKey, bundle: ResultBundle);
}

/// Cache key for a lookup: the lower-cased, trimmed query under a version
/// namespace, e.g. `v1:photosynthesis`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Namespace of the current key layout. Bump when bundle semantics change.
    pub const NAMESPACE: &'static str = "v1";

    pub fn from_query(query: &str) -> Self {
        Self(format!("{}:{}", Self::NAMESPACE, query.trim().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
