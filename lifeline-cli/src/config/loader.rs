use super::types::{
    ClassifierConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RECENT_LIMIT, HistoryConfig,
    LifelineConfig, RawClassifierConfig, RawHistoryConfig, RawLifelineConfig,
    RawRefinementConfig, RawServerConfig, ServerConfig,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use lifeline_core::RefinementConfig;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<LifelineConfig> {
        let mut raw = RawLifelineConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path()
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        // Convert to final config with defaults applied
        Ok(Self::finalize(raw, Self::default_db_path()))
    }

    fn read_raw(path: &Path) -> Result<RawLifelineConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "lifeline")
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with LIFELINE_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("LIFELINE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".lifeline/config.toml")
        }
    }

    /// History database used when none is configured
    pub fn default_db_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join("history.db"))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawLifelineConfig, overlay: RawLifelineConfig) -> RawLifelineConfig {
        RawLifelineConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
                allowed_origins: overlay.server.allowed_origins.or(base.server.allowed_origins),
            },
            refinement: RawRefinementConfig {
                max_rounds: overlay.refinement.max_rounds.or(base.refinement.max_rounds),
                classifier_timeout_ms: overlay
                    .refinement
                    .classifier_timeout_ms
                    .or(base.refinement.classifier_timeout_ms),
                retain_terminal: overlay
                    .refinement
                    .retain_terminal
                    .or(base.refinement.retain_terminal),
                session_idle_secs: overlay
                    .refinement
                    .session_idle_secs
                    .or(base.refinement.session_idle_secs),
            },
            classifier: RawClassifierConfig {
                kind: overlay.classifier.kind.or(base.classifier.kind),
                url: overlay.classifier.url.or(base.classifier.url),
                map_path: overlay.classifier.map_path.or(base.classifier.map_path),
            },
            history: RawHistoryConfig {
                db_path: overlay.history.db_path.or(base.history.db_path),
                recent_limit: overlay.history.recent_limit.or(base.history.recent_limit),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawLifelineConfig, default_db_path: Option<PathBuf>) -> LifelineConfig {
        let refinement_defaults = RefinementConfig::default();
        LifelineConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
                allowed_origins: raw.server.allowed_origins.unwrap_or_default(),
            },
            refinement: RefinementConfig {
                max_rounds: raw
                    .refinement
                    .max_rounds
                    .unwrap_or(refinement_defaults.max_rounds),
                classifier_timeout_ms: raw
                    .refinement
                    .classifier_timeout_ms
                    .or(refinement_defaults.classifier_timeout_ms),
                retain_terminal: raw
                    .refinement
                    .retain_terminal
                    .unwrap_or(refinement_defaults.retain_terminal),
                session_idle_secs: raw
                    .refinement
                    .session_idle_secs
                    .unwrap_or(refinement_defaults.session_idle_secs),
            },
            classifier: ClassifierConfig {
                kind: raw.classifier.kind.unwrap_or_default(),
                url: raw.classifier.url,
                map_path: raw.classifier.map_path,
            },
            history: HistoryConfig {
                db_path: raw.history.db_path.or(default_db_path),
                recent_limit: raw.history.recent_limit.unwrap_or(DEFAULT_RECENT_LIMIT),
            },
        }
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<LifelineConfig> {
        let raw = if path.exists() {
            Self::read_raw(path)?
        } else {
            RawLifelineConfig::default()
        };
        Ok(Self::finalize(raw, None))
    }
}
