//! Shared application state for the lifeline server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lifeline_core::{
    Classifier, ClassifierError, HistoryRecorder, RefinementConfig, RefinementEngine,
    SessionStore, SymptomVocabulary,
};
use tokio::sync::OnceCell;

/// Default number of history entries returned per request
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Shared application state accessible by all handlers
pub struct AppState {
    /// Refinement engine owning sessions, classifier and history
    pub engine: Arc<RefinementEngine>,
    /// Default history page size
    pub recent_limit: usize,
    /// When the server started
    pub started_at: DateTime<Utc>,
    /// Vocabulary, fetched from the classifier on first use
    vocabulary: OnceCell<Arc<SymptomVocabulary>>,
}

impl AppState {
    /// Create AppState around an engine
    pub fn new(engine: Arc<RefinementEngine>) -> Self {
        Self {
            engine,
            recent_limit: DEFAULT_RECENT_LIMIT,
            started_at: Utc::now(),
            vocabulary: OnceCell::new(),
        }
    }

    /// Create AppState from collaborators with default engine config (for testing)
    pub fn new_for_testing(
        classifier: Arc<dyn Classifier>,
        history: Arc<dyn HistoryRecorder>,
    ) -> Self {
        let engine = RefinementEngine::new(
            classifier,
            history,
            Arc::new(SessionStore::new()),
            RefinementConfig::default(),
        );
        Self::new(Arc::new(engine))
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    /// Symptom vocabulary, cached after the first successful fetch
    pub async fn vocabulary(&self) -> Result<Arc<SymptomVocabulary>, ClassifierError> {
        self.vocabulary
            .get_or_try_init(|| async {
                let symptoms = self.engine.classifier().vocabulary().await?;
                tracing::debug!(count = symptoms.len(), "Loaded symptom vocabulary");
                Ok::<_, ClassifierError>(Arc::new(SymptomVocabulary::new(symptoms)))
            })
            .await
            .cloned()
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
