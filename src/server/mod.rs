//! HTTP service over a shared [`DiagramAggregator`].
//!
//! Routes:
//! - `GET /api/diagrams?query=...` (alias `q`) runs a lookup
//! - `GET /health` reports liveness and the build version
//!
//! Every response carries permissive CORS headers; preflight `OPTIONS`
//! requests are answered without a body.

pub mod config;
mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregator::DiagramAggregator;

pub use routes::{ApiError, HealthResponse, LookupParams};

/// Build the service router.
pub fn router(aggregator: Arc<DiagramAggregator>) -> Router {
    Router::new()
        .route(
            "/api/diagrams",
            get(routes::lookup).options(routes::preflight),
        )
        .route("/health", get(routes::health))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(aggregator)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
