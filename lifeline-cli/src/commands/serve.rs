//! Lifeline serve command
//!
//! Runs the HTTP API that web and terminal clients drive a refinement
//! session through.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use lifeline_server::{AppState, LifelineServer, ServerConfig};
use tracing::info;

use crate::components::build_engine;
use crate::config::{ConfigLoader, LifelineConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let server_config = server_config(&args, &config);

    let engine = build_engine(&config)?;
    let state = AppState::new(engine).with_recent_limit(config.history.recent_limit);

    info!(
        "Starting lifeline server on {}:{}",
        server_config.host, server_config.port
    );

    LifelineServer::new(server_config, Arc::new(state))
        .run()
        .await
        .map_err(Into::into)
}

/// Command-line flags win over the loaded configuration
fn server_config(args: &ServeArgs, config: &LifelineConfig) -> ServerConfig {
    ServerConfig {
        host: args.host.clone().unwrap_or_else(|| config.server.host.clone()),
        port: args.port.unwrap_or(config.server.port),
        allowed_origins: config.server.allowed_origins.clone(),
        ..ServerConfig::default()
    }
}
