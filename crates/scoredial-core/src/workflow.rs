//! Prediction workflow controller.
//!
//! Owns the single [`PredictionState`] for the form and sequences one
//! round trip to the scoring service per submission:
//! `Idle -> Submitting -> {Succeeded | Failed}`.
//!
//! The controller is the only writer. Renderers read through
//! [`WorkflowController::subscribe`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::ServiceError;
use crate::model::{FormSnapshot, PredictionResponse, PredictionState, Score};
use crate::traits::ScoringService;

/// Fallback message for application-level failures.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to get prediction";

/// Fallback message for transport failures that carry no description.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Read-only view of the workflow state.
pub type StateReceiver = watch::Receiver<PredictionState>;

/// Which resolution wins when submissions overlap.
///
/// Requests are never cancelled. With `LatestIssuedWins` each submission
/// carries a sequence number and a resolution that arrives after a newer
/// submission has started is discarded. With `LastResolvedWins` whatever
/// resolves last overwrites the state, even if it belongs to an older
/// submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RacePolicy {
    #[default]
    LatestIssuedWins,
    LastResolvedWins,
}

/// The result of resolving one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Sequence number of the submission, starting at 1.
    pub sequence: u64,
    /// The state this submission resolved to.
    pub state: PredictionState,
    /// Whether `state` was published. `false` when a newer submission
    /// superseded this one under [`RacePolicy::LatestIssuedWins`].
    pub applied: bool,
}

/// Owns the lifecycle of the prediction request.
pub struct WorkflowController {
    service: Arc<dyn ScoringService>,
    state: watch::Sender<PredictionState>,
    issued: AtomicU64,
    policy: RacePolicy,
}

impl WorkflowController {
    pub fn new(service: Arc<dyn ScoringService>) -> Self {
        let (state, _) = watch::channel(PredictionState::Idle);
        Self {
            service,
            state,
            issued: AtomicU64::new(0),
            policy: RacePolicy::default(),
        }
    }

    pub fn with_race_policy(mut self, policy: RacePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn race_policy(&self) -> RacePolicy {
        self.policy
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> PredictionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> StateReceiver {
        self.state.subscribe()
    }

    /// Start a submission. The state is `Submitting` when this returns,
    /// before any request has been issued.
    pub fn begin(&self, snapshot: FormSnapshot) -> Submission<'_> {
        // Issued under the watch lock so `settle` sees sequence and state together.
        let mut sequence = 0;
        self.state.send_modify(|state| {
            sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            *state = PredictionState::Submitting;
        });
        tracing::debug!(
            sequence,
            service = self.service.name(),
            fields = snapshot.len(),
            "prediction submitting"
        );
        Submission {
            controller: self,
            sequence,
            snapshot,
        }
    }

    /// Submit `snapshot` and wait for it to resolve.
    pub async fn submit(&self, snapshot: FormSnapshot) -> Resolution {
        self.begin(snapshot).resolve().await
    }

    fn settle(&self, sequence: u64, state: PredictionState) -> Resolution {
        let applied = self.state.send_if_modified(|current| {
            if self.policy == RacePolicy::LatestIssuedWins
                && sequence != self.issued.load(Ordering::SeqCst)
            {
                return false;
            }
            *current = state.clone();
            true
        });

        if !applied {
            tracing::debug!(
                sequence,
                latest = self.issued.load(Ordering::SeqCst),
                "discarding superseded prediction"
            );
            return Resolution {
                sequence,
                state,
                applied,
            };
        }

        match &state {
            PredictionState::Succeeded { score, suggestions } => tracing::info!(
                sequence,
                score = score.value(),
                suggestions = suggestions.len(),
                "prediction succeeded"
            ),
            PredictionState::Failed { message } => {
                tracing::warn!(sequence, %message, "prediction failed")
            }
            _ => {}
        }
        Resolution {
            sequence,
            state,
            applied,
        }
    }
}

/// A submission that has entered `Submitting` but has not been sent yet.
#[must_use = "a submission does nothing until resolved"]
pub struct Submission<'a> {
    controller: &'a WorkflowController,
    sequence: u64,
    snapshot: FormSnapshot,
}

impl Submission<'_> {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Issue the request and publish its outcome.
    pub async fn resolve(self) -> Resolution {
        let outcome = self.controller.service.predict(&self.snapshot).await;
        self.controller
            .settle(self.sequence, state_from_outcome(outcome))
    }
}

/// Map a service outcome onto the terminal state for its submission.
///
/// Every failure path yields `Failed` with a non-empty message.
pub fn state_from_outcome(outcome: Result<PredictionResponse, ServiceError>) -> PredictionState {
    match outcome {
        Ok(response) => match (response.success, response.prediction) {
            (true, Some(prediction)) => PredictionState::Succeeded {
                score: Score(prediction),
                suggestions: response.suggestions.unwrap_or_default(),
            },
            _ => PredictionState::Failed {
                message: non_empty(response.error, GENERIC_FAILURE_MESSAGE),
            },
        },
        Err(err) => PredictionState::Failed {
            message: non_empty(Some(err.to_string()), GENERIC_ERROR_MESSAGE),
        },
    }
}

fn non_empty(message: Option<String>, fallback: &str) -> String {
    match message {
        Some(m) if !m.trim().is_empty() => m,
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use super::*;
    use crate::model::FieldValue;

    type Outcome = Result<PredictionResponse, ServiceError>;

    struct FixedService(Outcome);

    #[async_trait]
    impl ScoringService for FixedService {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn predict(&self, _: &FormSnapshot) -> Outcome {
            self.0.clone()
        }
    }

    /// Holds each request open until the test releases it, keyed by the
    /// snapshot's `id` field.
    struct GatedService {
        gates: Mutex<HashMap<String, oneshot::Receiver<Outcome>>>,
    }

    impl GatedService {
        fn new() -> (Self, HashMap<String, oneshot::Sender<Outcome>>) {
            let mut gates = HashMap::new();
            let mut senders = HashMap::new();
            for id in ["a", "b"] {
                let (tx, rx) = oneshot::channel();
                gates.insert(id.to_string(), rx);
                senders.insert(id.to_string(), tx);
            }
            (
                Self {
                    gates: Mutex::new(gates),
                },
                senders,
            )
        }
    }

    #[async_trait]
    impl ScoringService for GatedService {
        fn name(&self) -> &str {
            "gated"
        }

        async fn predict(&self, snapshot: &FormSnapshot) -> Outcome {
            let Some(FieldValue::Text(id)) = snapshot.get("id") else {
                return Err(ServiceError::transport("missing id"));
            };
            let gate = self.gates.lock().unwrap().remove(id);
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(ServiceError::transport("gate dropped"))),
                None => Err(ServiceError::transport("unknown id")),
            }
        }
    }

    fn controller(outcome: Outcome) -> WorkflowController {
        WorkflowController::new(Arc::new(FixedService(outcome)))
    }

    fn sample() -> FormSnapshot {
        FormSnapshot::new().with("age", "20").with("gender", "Male")
    }

    #[tokio::test]
    async fn starts_idle() {
        let c = controller(Ok(PredictionResponse::succeeded(50.0, vec![])));
        assert_eq!(c.state(), PredictionState::Idle);
        assert_eq!(*c.subscribe().borrow(), PredictionState::Idle);
    }

    #[tokio::test]
    async fn begin_is_submitting_before_request_settles() {
        let c = controller(Ok(PredictionResponse::succeeded(50.0, vec![])));
        let mut rx = c.subscribe();

        let submission = c.begin(sample());
        assert_eq!(c.state(), PredictionState::Submitting);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_loading());

        let resolution = submission.resolve().await;
        assert!(resolution.applied);
        assert_eq!(resolution.sequence, 1);
        assert_eq!(c.state().score(), Some(Score(50.0)));
    }

    #[tokio::test]
    async fn success_carries_score_and_suggestions() {
        let c = controller(Ok(PredictionResponse::succeeded(
            78.5,
            vec!["Study more".into(), "Reduce social media".into()],
        )));
        c.submit(sample()).await;
        assert_eq!(
            c.state(),
            PredictionState::Succeeded {
                score: Score(78.5),
                suggestions: vec!["Study more".into(), "Reduce social media".into()],
            }
        );
    }

    #[tokio::test]
    async fn missing_suggestions_default_to_empty() {
        let c = controller(Ok(PredictionResponse {
            success: true,
            prediction: Some(61.0),
            ..Default::default()
        }));
        let resolution = c.submit(sample()).await;
        assert_eq!(resolution.state.suggestions(), &[] as &[String]);
    }

    #[tokio::test]
    async fn application_failure_uses_server_message() {
        let c = controller(Ok(PredictionResponse::failed("Model prediction failed")));
        c.submit(sample()).await;
        assert_eq!(
            c.state(),
            PredictionState::Failed {
                message: "Model prediction failed".into()
            }
        );
    }

    #[tokio::test]
    async fn application_failure_without_message_uses_fallback() {
        let c = controller(Ok(PredictionResponse::default()));
        c.submit(sample()).await;
        assert_eq!(c.state().error_message(), Some(GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn success_without_prediction_is_failure() {
        let c = controller(Ok(PredictionResponse {
            success: true,
            suggestions: Some(vec!["ignored".into()]),
            ..Default::default()
        }));
        c.submit(sample()).await;
        assert_eq!(c.state().error_message(), Some(GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn transport_failure_uses_error_description() {
        let c = controller(Err(ServiceError::transport("Network error")));
        c.submit(sample()).await;
        assert_eq!(
            c.state(),
            PredictionState::Failed {
                message: "Network error".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_and_empty_errors_never_leave_blank_message() {
        let c = controller(Err(ServiceError::malformed("expected value at line 1")));
        c.submit(sample()).await;
        assert_eq!(c.state().error_message(), Some("expected value at line 1"));

        let c = controller(Err(ServiceError::transport("")));
        c.submit(sample()).await;
        assert_eq!(c.state().error_message(), Some(GENERIC_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn resubmit_resets_to_submitting() {
        let c = controller(Ok(PredictionResponse::failed("nope")));
        c.submit(sample()).await;
        assert!(c.state().error_message().is_some());

        let submission = c.begin(sample());
        assert_eq!(c.state(), PredictionState::Submitting);
        assert_eq!(submission.sequence(), 2);
        drop(submission);
    }

    #[tokio::test]
    async fn superseded_resolution_leaves_newer_submission_loading() {
        let c = controller(Ok(PredictionResponse::succeeded(55.0, vec![])));
        let mut rx = c.subscribe();
        let older = c.begin(sample());
        let newer = c.begin(sample());
        rx.borrow_and_update();

        let resolution = older.resolve().await;
        assert!(!resolution.applied);
        assert_eq!(resolution.state.score(), Some(Score(55.0)));
        assert_eq!(c.state(), PredictionState::Submitting);
        assert!(!rx.has_changed().unwrap());

        assert!(newer.resolve().await.applied);
        assert_eq!(c.state().score(), Some(Score(55.0)));
    }

    async fn race(policy: RacePolicy) -> (WorkflowController, Resolution, Resolution) {
        let (service, mut senders) = GatedService::new();
        let c = WorkflowController::new(Arc::new(service)).with_race_policy(policy);
        let tx_a = senders.remove("a").unwrap();
        let tx_b = senders.remove("b").unwrap();

        let first = c.begin(FormSnapshot::new().with("id", "a"));
        let second = c.begin(FormSnapshot::new().with("id", "b"));

        // The older request resolves last.
        let driver = async {
            tx_b.send(Ok(PredictionResponse::succeeded(90.0, vec![])))
                .unwrap();
            while c.state() == PredictionState::Submitting {
                tokio::task::yield_now().await;
            }
            tx_a.send(Ok(PredictionResponse::succeeded(40.0, vec![])))
                .unwrap();
        };

        let (a, b, ()) = tokio::join!(first.resolve(), second.resolve(), driver);
        (c, a, b)
    }

    #[tokio::test]
    async fn stale_resolution_is_discarded_by_default() {
        let (c, a, b) = race(RacePolicy::LatestIssuedWins).await;
        assert!(!a.applied);
        assert!(b.applied);
        assert_eq!(c.state().score(), Some(Score(90.0)));
    }

    #[tokio::test]
    async fn last_resolved_wins_when_configured() {
        let (c, a, b) = race(RacePolicy::LastResolvedWins).await;
        assert!(a.applied);
        assert!(b.applied);
        assert_eq!(c.state().score(), Some(Score(40.0)));
    }

    #[test]
    fn race_policy_parses_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: RacePolicy,
        }
        let w: Wrapper = toml::from_str(r#"policy = "last-resolved-wins""#).unwrap();
        assert_eq!(w.policy, RacePolicy::LastResolvedWins);
    }
}
