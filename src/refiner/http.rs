//! Refinement through an external text-generation service.
//!
//! The service receives `{"question": "..."}` and answers with a JSON
//! object; only its `image_query` string field is consumed here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{QueryRefiner, accept_phrase};
use crate::{DiagramError, Result};

/// Default bound on one refinement call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(7);

#[derive(Serialize)]
struct RefineRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct RefineReply {
    #[serde(default)]
    image_query: Option<String>,
}

/// Refiner backed by a remote text-generation endpoint.
#[derive(Clone)]
pub struct HttpRefiner {
    http: Client,
    endpoint: String,
    timeout: Duration,
    bearer_token: Option<String>,
}

impl HttpRefiner {
    /// Create a refiner posting to `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = Client::builder().build().map_err(|e| {
            DiagramError::Configuration(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            bearer_token: None,
        })
    }

    /// Set the per-call timeout (default: 7 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `Authorization: Bearer <token>` with every call.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fallible core of [`QueryRefiner::refine`].
    async fn request_phrase(&self, question: &str) -> Result<Option<String>> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&RefineRequest { question })
            .timeout(self.timeout);
        if let Some(ref token) = self.bearer_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| DiagramError::from_reqwest(e, "query refinement", self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiagramError::Upstream {
                status: status.as_u16(),
                message: "refinement service returned an error".to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DiagramError::from_reqwest(e, "query refinement", self.timeout))?;
        let reply: RefineReply = serde_json::from_str(&body)?;
        Ok(reply.image_query.as_deref().and_then(accept_phrase))
    }
}

#[async_trait]
impl QueryRefiner for HttpRefiner {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(name = "refiner.http", skip(self, question))]
    async fn refine(&self, question: &str) -> Option<String> {
        match self.request_phrase(question).await {
            Ok(phrase) => {
                debug!(refined = phrase.is_some(), "refinement reply received");
                phrase
            }
            Err(e) => {
                warn!(error = %e, "query refinement unavailable");
                None
            }
        }
    }
}
