//! Request handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::DiagramError;
use crate::aggregator::DiagramAggregator;
use crate::types::ResultBundle;
use crate::version::{BuildInfo, build_info, version_string};

/// Query string of `GET /api/diagrams`.
#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    pub query: Option<String>,
    /// Short alias, used when `query` is absent.
    pub q: Option<String>,
}

impl LookupParams {
    fn question(&self) -> Option<&str> {
        self.query
            .as_deref()
            .or(self.q.as_deref())
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub build: BuildInfo,
}

/// A [`DiagramError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub DiagramError);

impl From<DiagramError> for ApiError {
    fn from(err: DiagramError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = json!({
            "error": self.0.category(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub(super) async fn lookup(
    State(aggregator): State<Arc<DiagramAggregator>>,
    Query(params): Query<LookupParams>,
) -> Result<Json<ResultBundle>, ApiError> {
    let question = params.question().ok_or_else(|| {
        DiagramError::InvalidInput("query parameter is required".to_string())
    })?;
    let bundle = aggregator.lookup(question).await?;
    Ok(Json(bundle))
}

pub(super) async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: version_string(),
        build: build_info(),
    })
}
