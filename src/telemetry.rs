//! Metric names emitted by the lookup pipeline.
//!
//! Nothing is exported unless the embedding application installs a
//! `metrics` recorder; without one every counter and histogram call is a
//! no-op.
//!
//! Names share the `diagram_lookup_` prefix; counters end in `_total` and
//! the duration histogram is in seconds.
//!
//! # Common labels
//!
//! - `outcome`: lookup result: "hit", "ok" or "error"
//! - `repository`: repository name (e.g. "wikimedia-commons")
//! - `status`: upstream call outcome: "ok", "error" or "timeout"

/// Total lookups served.
///
/// Labels: `outcome` ("hit" | "ok" | "error").
pub const LOOKUPS_TOTAL: &str = "diagram_lookup_lookups_total";

/// Lookup duration in seconds, cache hits included.
pub const LOOKUP_DURATION_SECONDS: &str = "diagram_lookup_lookup_duration_seconds";

/// Total repository searches issued.
///
/// Labels: `repository`, `status` ("ok" | "error" | "timeout").
pub const UPSTREAM_REQUESTS_TOTAL: &str = "diagram_lookup_upstream_requests_total";

/// Total diagram-biased fallback searches.
pub const FALLBACK_PASSES_TOTAL: &str = "diagram_lookup_fallback_passes_total";

/// Total refinement attempts.
///
/// Labels: `outcome` ("refined" | "none" | "timeout").
pub const REFINEMENTS_TOTAL: &str = "diagram_lookup_refinements_total";

/// Total result cache hits.
pub const CACHE_HITS_TOTAL: &str = "diagram_lookup_cache_hits_total";

/// Total result cache misses (expired entries included).
pub const CACHE_MISSES_TOTAL: &str = "diagram_lookup_cache_misses_total";
