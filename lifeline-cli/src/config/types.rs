use lifeline_core::RefinementConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default port for the lifeline server
pub const DEFAULT_PORT: u16 = 5000;
/// Default host for the lifeline server
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default number of history rows shown
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLifelineConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub refinement: RawRefinementConfig,

    #[serde(default)]
    pub classifier: RawClassifierConfig,

    #[serde(default)]
    pub history: RawHistoryConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRefinementConfig {
    pub max_rounds: Option<u32>,
    pub classifier_timeout_ms: Option<u64>,
    pub retain_terminal: Option<bool>,
    pub session_idle_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawClassifierConfig {
    pub kind: Option<ClassifierKind>,
    pub url: Option<String>,
    pub map_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawHistoryConfig {
    pub db_path: Option<PathBuf>,
    pub recent_limit: Option<usize>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LifelineConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub refinement: RefinementConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port for the lifeline server
    pub port: u16,

    /// Origins allowed by CORS; empty allows any
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
        }
    }
}

/// Which classifier backs the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Local disease table
    #[default]
    SymptomMap,
    /// Remote model service
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub kind: ClassifierKind,

    /// Base URL of the model service (kind = "http")
    pub url: Option<String>,

    /// Disease table to load instead of the built-in one (kind = "symptom_map")
    pub map_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// SQLite database; history is kept in memory when unset
    pub db_path: Option<PathBuf>,

    /// Rows returned when no limit is given
    pub recent_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}
