//! SQLite-backed history recorder

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use super::error::HistoryError;
use super::migrations::Migrator;
use super::recorder::HistoryRecorder;
use super::types::HistoryEntry;
use crate::symptom::SymptomSet;

/// SQLite-backed prediction history
pub struct SqliteHistoryRecorder {
    conn: Mutex<Connection>,
}

impl SqliteHistoryRecorder {
    /// Open or create database at path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| HistoryError::Write(format!("{}: {}", parent.display(), e)))?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, HistoryError> {
        Migrator::new(&conn).migrate()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn insert(
        &self,
        user_id: &str,
        diagnosis: &str,
        symptoms: &SymptomSet,
        at: DateTime<Utc>,
    ) -> Result<(), HistoryError> {
        let symptoms_json = serde_json::to_string(symptoms)?;
        self.conn().execute(
            "INSERT INTO predictions (user_id, diagnosis, symptoms, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id, diagnosis, symptoms_json, at.timestamp_millis()],
        )?;
        Ok(())
    }

    fn select_recent(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT diagnosis, symptoms, created_at FROM predictions
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(rusqlite::params![user_id, limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (diagnosis, symptoms_json, created_at) = row?;
            entries.push(HistoryEntry {
                diagnosis,
                symptoms: serde_json::from_str(&symptoms_json)?,
                timestamp: DateTime::from_timestamp_millis(created_at).unwrap_or_default(),
            });
        }
        Ok(entries)
    }
}

#[async_trait]
impl HistoryRecorder for SqliteHistoryRecorder {
    async fn append(
        &self,
        user_id: &str,
        diagnosis: &str,
        symptoms: &SymptomSet,
    ) -> Result<(), HistoryError> {
        self.insert(user_id, diagnosis, symptoms, Utc::now())
    }

    async fn list_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        self.select_recent(user_id, limit)
    }
}
