//! Server error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lifeline_core::{ClassifierError, HistoryError, RefinementError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in the lifeline server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid server configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// A handler failure with its HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", message)
    }
}

impl From<RefinementError> for ApiError {
    fn from(e: RefinementError) -> Self {
        let (status, code) = match &e {
            _ if e.is_absent_session() => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            RefinementError::EmptyInput => (StatusCode::BAD_REQUEST, "EMPTY_INPUT"),
            RefinementError::NoPendingQuestion(_) => (StatusCode::CONFLICT, "NO_PENDING_QUESTION"),
            RefinementError::InvalidState { .. } => (StatusCode::CONFLICT, "INVALID_STATE"),
            RefinementError::ClassifierUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "CLASSIFIER_UNAVAILABLE")
            }
        };
        Self::new(status, code, e.to_string())
    }
}

impl From<ClassifierError> for ApiError {
    fn from(e: ClassifierError) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "CLASSIFIER_UNAVAILABLE",
            e.to_string(),
        )
    }
}

impl From<HistoryError> for ApiError {
    fn from(e: HistoryError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "HISTORY_ERROR", e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(code = self.code, error = %self.message, "Request failed");
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refinement_errors_map_to_statuses() {
        let cases = [
            (RefinementError::EmptyInput, StatusCode::BAD_REQUEST),
            (
                RefinementError::NoPendingQuestion("s1".into()),
                StatusCode::CONFLICT,
            ),
            (
                RefinementError::InvalidState {
                    session_id: "s1".into(),
                    state: "concluded".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                RefinementError::InvalidState {
                    session_id: "s1".into(),
                    state: "absent".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                RefinementError::ClassifierUnavailable(ClassifierError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }
    }

    #[test]
    fn history_errors_are_internal() {
        let error = ApiError::from(HistoryError::Write("disk full".into()));
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.code, "HISTORY_ERROR");
    }
}
