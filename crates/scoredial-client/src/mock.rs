//! Mock scoring service for demos and testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use scoredial_core::model::{FormSnapshot, PredictionResponse};
use scoredial_core::{ScoringService, ServiceError};

/// A scoring service that answers every request with the same outcome.
pub struct MockScoringService {
    outcome: Result<PredictionResponse, ServiceError>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last snapshot received.
    last_snapshot: Mutex<Option<FormSnapshot>>,
}

impl MockScoringService {
    /// Answers every request with `outcome`.
    pub fn new(outcome: Result<PredictionResponse, ServiceError>) -> Self {
        Self {
            outcome,
            call_count: AtomicU32::new(0),
            last_snapshot: Mutex::new(None),
        }
    }

    /// Always predicts `score` with the given suggestions.
    pub fn succeeding(score: f64, suggestions: Vec<String>) -> Self {
        Self::new(Ok(PredictionResponse::succeeded(score, suggestions)))
    }

    /// Always answers `{success: false, error}`.
    pub fn failing(error: &str) -> Self {
        Self::new(Ok(PredictionResponse::failed(error)))
    }

    /// Always fails before a response is received.
    pub fn unreachable(message: &str) -> Self {
        Self::new(Err(ServiceError::transport(message)))
    }

    /// Number of `predict` calls so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The snapshot passed to the most recent call.
    pub fn last_snapshot(&self) -> Option<FormSnapshot> {
        self.last_snapshot
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ScoringService for MockScoringService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn predict(&self, snapshot: &FormSnapshot) -> Result<PredictionResponse, ServiceError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_snapshot.lock() {
            *last = Some(snapshot.clone());
        }
        self.outcome.clone()
    }
}
