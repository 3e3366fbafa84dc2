//! Scoring service error types.
//!
//! Defined in `scoredial-core` so the workflow controller can turn every
//! failure into a `Failed` state without knowing which transport produced it.

use thiserror::Error;

/// Errors that can occur while talking to the scoring service.
///
/// The `Display` output is the message shown to the user, so variants carry
/// the underlying description verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request never produced a response (connectivity, DNS, timeout).
    #[error("{0}")]
    Transport(String),

    /// A response arrived but its body was not a valid prediction payload.
    #[error("{0}")]
    MalformedResponse(String),
}

impl ServiceError {
    pub fn transport(message: impl Into<String>) -> Self {
        ServiceError::Transport(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ServiceError::MalformedResponse(message.into())
    }

    /// Returns `true` if the call failed before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, ServiceError::Transport(_))
    }
}
