//! HTTP scoring service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::instrument;

use scoredial_core::model::{FormSnapshot, PredictionResponse};
use scoredial_core::{ScoringService, ServiceError};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/predict";

/// Scoring service reached with a JSON POST.
pub struct HttpScoringService {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpScoringService {
    /// A client with no request timeout.
    pub fn new(endpoint: &str) -> Self {
        Self::with_timeout(endpoint, None)
    }

    pub fn with_timeout(endpoint: &str, timeout: Option<Duration>) -> Self {
        let endpoint = if endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            endpoint
        };

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().expect("failed to build HTTP client");

        Self {
            endpoint: endpoint.to_string(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::transport(format!("request to {} timed out ({err})", self.endpoint))
        } else if err.is_connect() {
            ServiceError::transport(format!(
                "scoring service not reachable at {}. Is it running? ({err})",
                self.endpoint
            ))
        } else {
            ServiceError::transport(err.to_string())
        }
    }
}

#[async_trait]
impl ScoringService for HttpScoringService {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, snapshot), fields(endpoint = %self.endpoint))]
    async fn predict(&self, snapshot: &FormSnapshot) -> Result<PredictionResponse, ServiceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(snapshot)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        // Application failures come back as HTTP 400 with a JSON payload, so
        // the body is decoded whatever the status.
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        tracing::debug!(status, bytes = body.len(), "scoring service responded");

        serde_json::from_str(&body).map_err(|e| {
            ServiceError::malformed(format!(
                "invalid response from scoring service (HTTP {status}): {e}"
            ))
        })
    }
}
