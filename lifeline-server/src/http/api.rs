//! REST API handlers

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Number of refinement sessions held in memory
    pub active_sessions: usize,
}

/// Health check endpoint
///
/// Returns server status, version, uptime, and active session count.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let active_sessions = state.engine.active_sessions().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        active_sessions,
    })
}

/// One selectable symptom
#[derive(Debug, Serialize, Deserialize)]
pub struct SymptomEntry {
    /// Token sent back in requests
    pub id: String,
    /// Human-readable label
    pub label: String,
}

/// Response for the symptom vocabulary
#[derive(Debug, Serialize, Deserialize)]
pub struct SymptomsResponse {
    pub symptoms: Vec<SymptomEntry>,
}

/// GET /api/symptoms - List known symptoms
pub async fn symptoms(State(state): State<Arc<AppState>>) -> Result<Json<SymptomsResponse>, ApiError> {
    let vocabulary = state.vocabulary().await?;

    let symptoms = vocabulary
        .symptoms()
        .iter()
        .map(|s| SymptomEntry {
            id: s.as_str().to_string(),
            label: s.label(),
        })
        .collect();

    Ok(Json(SymptomsResponse { symptoms }))
}
