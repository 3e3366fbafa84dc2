//! Core trait definitions for scoring services.
//!
//! The async trait is implemented by the `scoredial-client` crate.

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::model::{FormSnapshot, PredictionResponse};

/// The remote collaborator that turns a form snapshot into a score.
#[async_trait]
pub trait ScoringService: Send + Sync {
    /// Human-readable service name (e.g. "http").
    fn name(&self) -> &str;

    /// Submit one snapshot and wait for the service's answer.
    ///
    /// An application-level failure is an `Ok` response with
    /// `success: false`; `Err` is reserved for transport and decoding
    /// failures.
    async fn predict(&self, snapshot: &FormSnapshot) -> Result<PredictionResponse, ServiceError>;
}
