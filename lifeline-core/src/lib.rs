//! lifeline-core: Diagnostic refinement engine
//!
//! This crate turns repeated symptom classifications into a bounded yes/no
//! dialogue that always ends in a diagnosis or an escalation:
//!
//! - **Symptoms** - [`Symptom`], [`SymptomSet`] and [`SymptomVocabulary`]
//! - **Classifiers** - the [`Classifier`] contract with a local
//!   [`SymptomMapClassifier`], a remote [`HttpClassifier`] and test mocks
//! - **History** - the [`HistoryRecorder`] contract with in-memory and SQLite stores
//! - **Sessions** - [`RefinementSession`] state and the [`SessionStore`]
//! - **Engine** - [`RefinementEngine`], the state machine tying them together
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use lifeline_core::{
//!     Answer, MemoryHistoryRecorder, RefinementConfig, RefinementEngine, RefinementResult,
//!     SessionStore, SymptomMapClassifier, SymptomSet,
//! };
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = RefinementEngine::new(
//!         Arc::new(SymptomMapClassifier::builtin()?),
//!         Arc::new(MemoryHistoryRecorder::new()),
//!         Arc::new(SessionStore::new()),
//!         RefinementConfig::default(),
//!     );
//!
//!     let symptoms: SymptomSet = ["high_fever"].into_iter().collect();
//!     let mut reply = engine.start_session("alice", symptoms).await?;
//!     while let RefinementResult::NeedsMoreInfo { question, .. } = &reply.result {
//!         println!("Do you have {}?", question.label());
//!         reply = engine.answer_question(&reply.session_id, Answer::No).await?;
//!     }
//!     println!("{:?}", reply.result);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               RefinementEngine               │
//! │  ┌──────────────┐        ┌────────────────┐  │
//! │  │ SessionStore │        │   Classifier   │  │
//! │  │ (per-session │        │ (symptom map / │  │
//! │  │    mutex)    │        │   HTTP model)  │  │
//! │  └──────────────┘        └────────────────┘  │
//! │            ┌──────────────────┐              │
//! │            │  HistoryRecorder │              │
//! │            └──────────────────┘              │
//! └──────────────────────────────────────────────┘
//! ```

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod session;
pub mod symptom;

// Re-export key types for convenience
pub use classifier::{
    CandidateDiagnosis, Classifier, HttpClassifier, MockClassifier, Prediction, Score,
    SlowMockClassifier, SymptomMapClassifier,
};
pub use config::RefinementConfig;
pub use engine::{ESCALATION_NOTICE, RefinementEngine, RefinementReply, RefinementResult};
pub use error::{ClassifierError, LifelineError, RefinementError};
pub use history::{
    HistoryEntry, HistoryError, HistoryRecorder, MemoryHistoryRecorder, SqliteHistoryRecorder,
};
pub use session::{Answer, RefinementSession, SessionSnapshot, SessionState, SessionStore};
pub use symptom::{Symptom, SymptomSet, SymptomVocabulary};
