//! SessionStore for concurrent access to refinement sessions
//!
//! The map itself sits behind an RwLock held only for lookups and inserts.
//! Each session has its own async mutex, so turns on different sessions
//! proceed in parallel while turns on the same session are serialized.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::state::{RefinementSession, SessionSnapshot};

/// Shared handle to one session
pub type SessionHandle = Arc<Mutex<RefinementSession>>;

/// In-memory registry of refinement sessions
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a session, returning its handle
    pub async fn put(&self, session: RefinementSession) -> SessionHandle {
        let id = session.id().to_string();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, handle.clone());
        handle
    }

    /// Get the handle for a session
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Copy of a session's current state
    pub async fn snapshot(&self, id: &str) -> Option<SessionSnapshot> {
        let handle = self.get(id).await?;
        let session = handle.lock().await;
        Some(session.snapshot())
    }

    /// True while `id` still maps to this exact handle
    ///
    /// A handle taken before a purge or delete is stale once the lock on it
    /// is acquired.
    pub async fn holds(&self, id: &str, handle: &SessionHandle) -> bool {
        self.sessions
            .read()
            .await
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
    }

    /// Remove a session; returns true if it existed
    pub async fn delete(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn list_ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Drop sessions untouched for longer than `idle`
    ///
    /// Sessions mid-turn (lock held) are skipped. Returns the number removed.
    pub async fn purge_idle(&self, idle: Duration) -> usize {
        let cutoff = Utc::now() - idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, handle| match handle.try_lock() {
            Ok(session) if session.updated_at() < cutoff => {
                debug!(session_id = %id, "Purging idle session");
                false
            }
            _ => true,
        });
        before - sessions.len()
    }
}
