//! Refinement session endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use lifeline_core::{Answer, RefinementReply, SessionSnapshot};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

/// Body of POST /api/refinement/sessions
#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub user_id: String,
    pub symptoms: Vec<String>,
}

/// Body of POST /api/refinement/sessions/:id/answer
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub answer: Answer,
}

/// POST /api/refinement/sessions - Start a session
///
/// Unknown symptom tokens are dropped; if none remain the request fails
/// with 400.
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<RefinementReply>, ApiError> {
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::bad_request("MISSING_USER", "user_id is required"));
    }

    let vocabulary = state.vocabulary().await?;
    let symptoms = vocabulary.filter(request.symptoms);

    let reply = state.engine.start_session(user_id, symptoms).await?;
    Ok(Json(reply))
}

/// POST /api/refinement/sessions/:id/answer - Answer the pending question
pub async fn answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<RefinementReply>, ApiError> {
    let reply = state.engine.answer_question(&id, request.answer).await?;
    Ok(Json(reply))
}

/// GET /api/refinement/sessions/:id - Inspect a session
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state
        .engine
        .session(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Session {} not found", id)))
}
