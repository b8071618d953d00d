//! Error types for lifeline-core

use std::time::Duration;

use thiserror::Error;

use crate::history::HistoryError;

/// Top-level error type for lifeline-core
#[derive(Error, Debug)]
pub enum LifelineError {
    #[error("Refinement error: {0}")]
    Refinement(#[from] RefinementError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Errors surfaced by the refinement engine
///
/// Input errors leave session state unchanged. Classifier errors leave the
/// session in its last stable state so the same round can be retried.
#[derive(Error, Debug)]
pub enum RefinementError {
    #[error("At least one known symptom is required")]
    EmptyInput,

    #[error("Session {session_id} is {state}")]
    InvalidState { session_id: String, state: String },

    #[error("Session {0} has no pending question")]
    NoPendingQuestion(String),

    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(#[from] ClassifierError),
}

impl RefinementError {
    pub(crate) fn absent(session_id: &str) -> Self {
        Self::InvalidState {
            session_id: session_id.to_string(),
            state: "absent".to_string(),
        }
    }

    /// Caller misuse; maps to a 4xx-equivalent signal
    pub fn is_input_error(&self) -> bool {
        !self.is_collaborator_error()
    }

    /// Transient external failure; the caller may retry
    pub fn is_collaborator_error(&self) -> bool {
        matches!(self, Self::ClassifierUnavailable(_))
    }

    /// True when the session id is unknown to the store
    pub fn is_absent_session(&self) -> bool {
        matches!(self, Self::InvalidState { state, .. } if state == "absent")
    }
}

/// Errors from classifier implementations
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier service unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed classifier response: {0}")]
    Malformed(String),

    #[error("Invalid classifier data: {0}")]
    Data(String),

    #[error("No scripted prediction left")]
    Exhausted,
}
