//! HTTP server module

mod api;
mod history;
mod refinement;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub use api::{HealthResponse, SymptomEntry, SymptomsResponse};
pub use history::{HistoryQuery, HistoryResponse, MAX_HISTORY_LIMIT};
pub use refinement::{AnswerRequest, StartSessionRequest};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/symptoms", get(api::symptoms))
        .route("/api/refinement/sessions", post(refinement::start_session))
        .route("/api/refinement/sessions/:id", get(refinement::get_session))
        .route("/api/refinement/sessions/:id/answer", post(refinement::answer))
        .route("/api/history/:user_id", get(history::list_recent))
        .with_state(state)
}
