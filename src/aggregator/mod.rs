//! Lookup orchestration.
//!
//! [`DiagramAggregator`] sequences the pipeline:
//!
//! 1. **Cache check**: a live bundle for the normalized query is returned
//!    as-is, with no network calls and no rescoring.
//! 2. **Refinement**: the [`QueryRefiner`](crate::refiner::QueryRefiner)
//!    gets a bounded window to propose a search phrase.
//! 3. **Candidate expansion**: the effective query, then its comma parts.
//! 4. **Primary pass**: candidates are searched strictly in order; image
//!    records are deduplicated by full URL and scored. Once
//!    `max_results` images are accepted no further candidates are tried.
//! 5. **Fallback pass**: if nothing was accepted, exactly one more search
//!    with a diagram/schematic/illustration disjunction.
//! 6. **Ranking**: stable sort by score, top `max_results`.
//! 7. **Cache store**: unconditional on success, empty bundles included.
//!
//! Concurrent lookups of the same uncached query are not coalesced; each
//! runs the full pipeline and the last store wins.

mod builder;
mod engine;
mod ranking;

pub use builder::{DiagramLookup, DiagramLookupBuilder, MAX_RESULTS_LIMIT};
pub use engine::{AggregatorConfig, DEFAULT_FALLBACK_TERMS, DiagramAggregator};
pub use ranking::rank;
