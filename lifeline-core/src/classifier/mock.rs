//! Mock classifier for testing
//!
//! MockClassifier allows scripting predictions for unit tests, enabling
//! fast, deterministic testing of the refinement engine. Every call is
//! recorded so tests can assert on how often and with what input the
//! classifier was invoked.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::traits::{Classifier, Prediction};
use crate::error::ClassifierError;
use crate::symptom::{Symptom, SymptomSet};

enum Scripted {
    Prediction(Prediction),
    Unavailable(String),
}

/// Inputs observed by one `predict` call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub symptoms: SymptomSet,
    pub excluded: SymptomSet,
}

/// Mock implementation of Classifier for testing
///
/// Queue predictions with `queue_prediction()` before driving the engine.
/// Each `predict()` consumes one queued entry. When the queue is empty the
/// fallback prediction is returned if one is set, otherwise
/// `ClassifierError::Exhausted`.
#[derive(Default)]
pub struct MockClassifier {
    responses: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Option<Prediction>>,
    vocabulary: Vec<Symptom>,
    calls: Mutex<Vec<RecordedCall>>,
    call_count: AtomicUsize,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a fixed vocabulary
    pub fn with_vocabulary<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symptom>,
    {
        Self {
            vocabulary: symptoms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Queue a prediction to be returned by the next predict()
    pub fn queue_prediction(&self, prediction: Prediction) {
        self.lock_responses()
            .push_back(Scripted::Prediction(prediction));
    }

    /// Queue a failure (convenience method)
    pub fn queue_unavailable(&self, message: &str) {
        self.lock_responses()
            .push_back(Scripted::Unavailable(message.to_string()));
    }

    /// Prediction returned whenever the queue is empty
    pub fn set_fallback(&self, prediction: Prediction) {
        *self.fallback.lock().unwrap_or_else(|e| e.into_inner()) = Some(prediction);
    }

    /// Number of predict() invocations so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Inputs of every predict() invocation, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn queued_count(&self) -> usize {
        self.lock_responses().len()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<Scripted>> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn predict(
        &self,
        symptoms: &SymptomSet,
        excluded: &SymptomSet,
    ) -> Result<Prediction, ClassifierError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                symptoms: symptoms.clone(),
                excluded: excluded.clone(),
            });

        let next = self.lock_responses().pop_front();
        match next {
            Some(Scripted::Prediction(prediction)) => Ok(prediction),
            Some(Scripted::Unavailable(message)) => Err(ClassifierError::Unavailable(message)),
            None => self
                .fallback
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
                .ok_or(ClassifierError::Exhausted),
        }
    }

    async fn vocabulary(&self) -> Result<Vec<Symptom>, ClassifierError> {
        Ok(self.vocabulary.clone())
    }
}
