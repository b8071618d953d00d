//! History recorder trait

use async_trait::async_trait;

use super::error::HistoryError;
use super::types::HistoryEntry;
use crate::symptom::SymptomSet;

/// Append-only log of concluded diagnoses, keyed by user
///
/// Failures are reported to the caller but never undo a diagnosis that
/// has already been decided.
#[async_trait]
pub trait HistoryRecorder: Send + Sync {
    /// Record a concluded diagnosis for `user_id`
    async fn append(
        &self,
        user_id: &str,
        diagnosis: &str,
        symptoms: &SymptomSet,
    ) -> Result<(), HistoryError>;

    /// Most recent entries for `user_id`, newest first
    async fn list_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, HistoryError>;
}
