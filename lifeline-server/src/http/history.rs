//! History REST API endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use lifeline_core::HistoryEntry;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on a single history page
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Query params for history list
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub entries: Vec<HistoryEntry>,
}

/// GET /api/history/:user_id
pub async fn list_recent(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.recent_limit)
        .min(MAX_HISTORY_LIMIT);
    let entries = state.engine.history().list_recent(&user_id, limit).await?;

    Ok(Json(HistoryResponse { user_id, entries }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use lifeline_core::{HistoryRecorder, MemoryHistoryRecorder, MockClassifier, SymptomSet};

    async fn create_test_app(entries: usize) -> Router {
        let history = Arc::new(MemoryHistoryRecorder::new());
        let symptoms: SymptomSet = ["fever"].into_iter().collect();
        for i in 0..entries {
            history
                .append("alice", &format!("D{}", i), &symptoms)
                .await
                .unwrap();
        }
        let state = Arc::new(
            AppState::new_for_testing(Arc::new(MockClassifier::new()), history)
                .with_recent_limit(3),
        );
        Router::new()
            .route("/api/history/:user_id", get(list_recent))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_history_defaults_to_recent_limit() {
        let server = TestServer::new(create_test_app(5).await).unwrap();

        let response = server.get("/api/history/alice").await;
        response.assert_status_ok();

        let body: HistoryResponse = response.json();
        assert_eq!(body.user_id, "alice");
        let names: Vec<_> = body.entries.iter().map(|e| e.diagnosis.as_str()).collect();
        assert_eq!(names, vec!["D4", "D3", "D2"]);
    }

    #[tokio::test]
    async fn test_history_explicit_limit() {
        let server = TestServer::new(create_test_app(5).await).unwrap();

        let body: HistoryResponse = server.get("/api/history/alice?limit=1").await.json();

        assert_eq!(body.entries.len(), 1);
        assert_eq!(body.entries[0].diagnosis, "D4");
    }

    #[tokio::test]
    async fn test_history_unknown_user_is_empty() {
        let server = TestServer::new(create_test_app(2).await).unwrap();

        let response = server.get("/api/history/bob").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: HistoryResponse = response.json();
        assert!(body.entries.is_empty());
    }

    #[tokio::test]
    async fn test_history_bad_limit_is_rejected() {
        let server = TestServer::new(create_test_app(0).await).unwrap();

        let response = server.get("/api/history/alice?limit=lots").await;

        assert!(response.status_code().is_client_error());
    }
}
