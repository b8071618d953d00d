//! Shared test utilities for lifeline-server integration tests

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use lifeline_core::{
    RefinementConfig, RefinementEngine, SessionStore, SqliteHistoryRecorder, SymptomMapClassifier,
};
use lifeline_server::{AppState, LifelineServer, ServerConfig};
use tokio::net::TcpListener;

/// Creates a server with the built-in symptom map and SQLite history at `db`
#[allow(dead_code)]
pub async fn create_test_server(db: &Path) -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_config(db, ServerConfig::default()).await
}

/// Creates a test server with custom config
#[allow(dead_code)]
pub async fn create_test_server_with_config(
    db: &Path,
    config: ServerConfig,
) -> (Arc<AppState>, SocketAddr) {
    let engine = RefinementEngine::new(
        Arc::new(SymptomMapClassifier::builtin().unwrap()),
        Arc::new(SqliteHistoryRecorder::open(db).unwrap()),
        Arc::new(SessionStore::new()),
        RefinementConfig::default(),
    );
    let state = Arc::new(AppState::new(Arc::new(engine)));

    let server = LifelineServer::new(config, Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: LifelineServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}
