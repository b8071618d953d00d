//! Build the engine's collaborators from configuration

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use lifeline_core::classifier::http::DEFAULT_TIMEOUT;
use lifeline_core::{
    Classifier, HistoryRecorder, HttpClassifier, MemoryHistoryRecorder, RefinementEngine,
    SessionStore, SqliteHistoryRecorder, SymptomMapClassifier,
};
use tracing::{info, warn};

use crate::config::{ClassifierConfig, ClassifierKind, HistoryConfig, LifelineConfig};

/// Create the configured classifier
pub fn build_classifier(
    config: &ClassifierConfig,
    timeout: Option<std::time::Duration>,
) -> Result<Arc<dyn Classifier>> {
    match config.kind {
        ClassifierKind::SymptomMap => {
            let classifier = match &config.map_path {
                Some(path) => SymptomMapClassifier::from_path(path)
                    .with_context(|| format!("loading symptom map {}", path.display()))?,
                None => SymptomMapClassifier::builtin()?,
            };
            info!(diseases = classifier.disease_count(), "Using symptom map classifier");
            Ok(Arc::new(classifier))
        }
        ClassifierKind::Http => {
            let Some(url) = &config.url else {
                bail!("classifier.url is required when classifier.kind = \"http\"");
            };
            let classifier = HttpClassifier::new(url.as_str(), timeout.unwrap_or(DEFAULT_TIMEOUT))?;
            info!(url = %url, "Using HTTP classifier");
            Ok(Arc::new(classifier))
        }
    }
}

/// Create the configured history recorder
pub fn build_history(config: &HistoryConfig) -> Result<Arc<dyn HistoryRecorder>> {
    let Some(path) = &config.db_path else {
        warn!("No history database configured; history will not survive a restart");
        return Ok(Arc::new(MemoryHistoryRecorder::new()));
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let recorder = SqliteHistoryRecorder::open(path)
        .with_context(|| format!("opening history database {}", path.display()))?;
    info!(path = %path.display(), "Using SQLite history");
    Ok(Arc::new(recorder))
}

/// Wire a refinement engine from the full configuration
pub fn build_engine(config: &LifelineConfig) -> Result<Arc<RefinementEngine>> {
    let classifier = build_classifier(&config.classifier, config.refinement.classifier_timeout())?;
    let history = build_history(&config.history)?;

    Ok(Arc::new(RefinementEngine::new(
        classifier,
        history,
        Arc::new(SessionStore::new()),
        config.refinement.clone(),
    )))
}
