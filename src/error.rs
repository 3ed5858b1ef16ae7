//! Diagram lookup error types

use std::time::Duration;

/// Diagram lookup error types
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    // Caller errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Upstream/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("{operation} timed out after {after:?}")]
    UpstreamTimeout {
        operation: &'static str,
        after: Duration,
    },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Every search attempted for a lookup failed, primary and fallback alike.
    #[error("failed to fetch diagrams for '{query}': all {attempts} searches failed (last: {source})")]
    AggregationFailed {
        query: String,
        attempts: usize,
        #[source]
        source: Box<DiagramError>,
    },

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DiagramError {
    /// Map a reqwest failure, keeping timeouts distinguishable.
    pub(crate) fn from_reqwest(err: reqwest::Error, operation: &'static str, after: Duration) -> Self {
        if err.is_timeout() {
            DiagramError::UpstreamTimeout { operation, after }
        } else if let Some(status) = err.status() {
            DiagramError::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            DiagramError::Http(err.to_string())
        }
    }

    /// Stable category string reported to HTTP callers.
    pub fn category(&self) -> &'static str {
        match self {
            DiagramError::InvalidInput(_) => "validation_error",
            DiagramError::Http(_) | DiagramError::Upstream { .. } => "upstream_error",
            DiagramError::UpstreamTimeout { .. } => "upstream_timeout",
            DiagramError::Json(_) => "malformed_response",
            DiagramError::AggregationFailed { .. } => "aggregation_failed",
            DiagramError::Configuration(_) => "configuration_error",
        }
    }

    /// Whether the caller, not the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DiagramError::InvalidInput(_))
    }

    /// Whether this error originated from a collaborator call.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            DiagramError::Http(_)
                | DiagramError::Upstream { .. }
                | DiagramError::UpstreamTimeout { .. }
                | DiagramError::Json(_)
        )
    }
}

/// Result type alias for diagram lookup operations
pub type Result<T> = std::result::Result<T, DiagramError>;
