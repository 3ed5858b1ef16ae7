//! diagram-lookup - ranked educational diagrams from Wikimedia Commons
//!
//! This crate turns a free-text question ("how does a heart valve work?")
//! into a short, ranked list of openly licensed images. A lookup optionally
//! refines the question into a search phrase, searches Commons once per
//! candidate phrase, keeps only image files, scores them against the query
//! keywords and caches the resulting bundle for six hours.
//!
//! # Example
//!
//! ```rust,no_run
//! use diagram_lookup::{CommonsConfig, DiagramLookup, KeywordRefiner};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> diagram_lookup::Result<()> {
//!     let aggregator = DiagramLookup::builder()
//!         .commons(CommonsConfig::default())
//!         .refiner(Arc::new(KeywordRefiner::new()))
//!         .build()?;
//!
//!     let bundle = aggregator.lookup("How does the human heart pump blood?").await?;
//!     for image in &bundle.images {
//!         println!("{} ({}, {})", image.title, image.author, image.license);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Service mode
//!
//! With the `server` feature (on by default) the [`server`] module exposes
//! the aggregator as `GET /api/diagrams?query=...`, and the `diagramd`
//! binary runs it from a TOML configuration file.

pub mod aggregator;
pub mod cache;
pub mod error;
pub mod query;
pub mod refiner;
pub mod repository;
pub mod scoring;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use aggregator::{AggregatorConfig, DiagramAggregator, DiagramLookup, DiagramLookupBuilder};
pub use error::{DiagramError, Result};
pub use version::{PKG_VERSION, version_string};

pub use cache::{BundleCache, CacheConfig, CacheKey, Clock, InMemoryBundleCache, SystemClock};
pub use refiner::{HttpRefiner, KeywordRefiner, NoRefiner, QueryRefiner};
pub use repository::{CommonsClient, CommonsConfig, MediaRepository, PageRecord};
pub use scoring::{KeywordSet, StopWords};
pub use types::{Candidate, ImageResult, ResultBundle};
