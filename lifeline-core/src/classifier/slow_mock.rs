//! Slow mock classifier for concurrency testing
//!
//! SlowMockClassifier wraps MockClassifier and adds a configurable delay
//! before each prediction. This is useful for testing that sessions do not
//! block each other in the SessionStore.

use std::time::Duration;

use async_trait::async_trait;

use super::mock::MockClassifier;
use super::traits::{Classifier, Prediction};
use crate::error::ClassifierError;
use crate::symptom::{Symptom, SymptomSet};

/// MockClassifier wrapper that adds configurable delay
pub struct SlowMockClassifier {
    inner: MockClassifier,
    delay: Duration,
}

impl SlowMockClassifier {
    /// Create with specified delay
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockClassifier::new(),
            delay,
        }
    }

    /// Access the wrapped mock for scripting and assertions
    pub fn inner(&self) -> &MockClassifier {
        &self.inner
    }
}

#[async_trait]
impl Classifier for SlowMockClassifier {
    async fn predict(
        &self,
        symptoms: &SymptomSet,
        excluded: &SymptomSet,
    ) -> Result<Prediction, ClassifierError> {
        tokio::time::sleep(self.delay).await;
        self.inner.predict(symptoms, excluded).await
    }

    async fn vocabulary(&self) -> Result<Vec<Symptom>, ClassifierError> {
        self.inner.vocabulary().await
    }
}
