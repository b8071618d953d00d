//! Symptom classifier abstraction

pub mod http;
pub mod mock;
pub mod slow_mock;
pub mod symptom_map;
pub mod traits;

// Re-export key types for convenience
pub use http::HttpClassifier;
pub use mock::{MockClassifier, RecordedCall};
pub use slow_mock::SlowMockClassifier;
pub use symptom_map::SymptomMapClassifier;
pub use traits::{CandidateDiagnosis, Classifier, Prediction, Score, rank};
