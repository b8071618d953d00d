//! Refinement engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Round cap used when none is configured
pub const DEFAULT_MAX_ROUNDS: u32 = 3;

/// Configuration for the refinement engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementConfig {
    /// Maximum number of yes/no questions per session
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Per-call classifier timeout; `None` waits indefinitely
    #[serde(default = "default_classifier_timeout_ms")]
    pub classifier_timeout_ms: Option<u64>,
    /// Keep concluded/escalated sessions in the store for inspection
    #[serde(default)]
    pub retain_terminal: bool,
    /// Idle sessions older than this are purged
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

fn default_classifier_timeout_ms() -> Option<u64> {
    Some(10_000)
}

fn default_session_idle_secs() -> u64 {
    1800
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            classifier_timeout_ms: default_classifier_timeout_ms(),
            retain_terminal: false,
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl RefinementConfig {
    pub fn classifier_timeout(&self) -> Option<Duration> {
        self.classifier_timeout_ms.map(Duration::from_millis)
    }

    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.session_idle_secs).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = RefinementConfig::default();
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.classifier_timeout(), Some(Duration::from_secs(10)));
        assert!(!config.retain_terminal);
        assert_eq!(config.idle_timeout(), chrono::Duration::minutes(30));
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: RefinementConfig = toml::from_str("").unwrap();
        assert_eq!(config, RefinementConfig::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config: RefinementConfig = toml::from_str("max_rounds = 5\nretain_terminal = true").unwrap();
        assert_eq!(config.max_rounds, 5);
        assert!(config.retain_terminal);
        assert_eq!(config.session_idle_secs, 1800);
    }
}
