//! In-memory history recorder

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::HistoryError;
use super::recorder::HistoryRecorder;
use super::types::HistoryEntry;
use crate::symptom::SymptomSet;

/// History kept in process memory
///
/// Used by tests and by servers started without a database. Writes can be
/// made to fail on demand to exercise best-effort history handling.
#[derive(Default)]
pub struct MemoryHistoryRecorder {
    entries: RwLock<HashMap<String, Vec<HistoryEntry>>>,
    failing: AtomicBool,
    append_calls: AtomicUsize,
}

impl MemoryHistoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent appends fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of append() invocations, including failed ones
    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    /// Number of stored entries for a user
    pub async fn entry_count(&self, user_id: &str) -> usize {
        self.entries
            .read()
            .await
            .get(user_id)
            .map_or(0, |entries| entries.len())
    }
}

#[async_trait]
impl HistoryRecorder for MemoryHistoryRecorder {
    async fn append(
        &self,
        user_id: &str,
        diagnosis: &str,
        symptoms: &SymptomSet,
    ) -> Result<(), HistoryError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(HistoryError::Write("recorder is failing".into()));
        }

        self.entries
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(HistoryEntry::now(diagnosis, symptoms.clone()));
        Ok(())
    }

    async fn list_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(user_id)
            .map(|list| list.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
