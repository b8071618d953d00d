//! lifeline-server - HTTP server for diagnostic refinement
//!
//! This crate exposes the refinement engine, the symptom vocabulary and
//! per-user history over a JSON API. Web and terminal clients only render
//! the results it returns.

mod error;
pub mod http;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ErrorResponse, ServerError};
pub use http::create_router;
pub use state::{AppState, DEFAULT_RECENT_LIMIT};

/// The main lifeline server
pub struct LifelineServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl LifelineServer {
    /// Create a server around prepared state
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("lifeline server listening on {}", addr);
        self.run_with_listener(listener).await
    }

    /// Run the server on an already bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        let cors = cors_layer(&self.config)?;
        self.start_session_purge();

        let router = create_router(self.state).layer(cors);
        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(())
    }

    /// Start a background task that drops abandoned sessions
    fn start_session_purge(&self) {
        let Some(every) = self.config.purge_interval() else {
            return;
        };
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                state.engine.purge_idle().await;
            }
        });
    }
}

/// CORS policy: any origin unless origins are configured
fn cors_layer(config: &ServerConfig) -> Result<CorsLayer, ServerError> {
    if config.allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| ServerError::Config(format!("invalid origin {:?}: {}", origin, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Origins allowed by CORS; empty allows any
    pub allowed_origins: Vec<String>,
    /// Seconds between idle-session purges; 0 disables purging
    pub purge_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            allowed_origins: Vec::new(),
            purge_interval_secs: 60,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Returns the socket address string (e.g., "127.0.0.1:5000")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn purge_interval(&self) -> Option<Duration> {
        (self.purge_interval_secs > 0).then(|| Duration::from_secs(self.purge_interval_secs))
    }
}
