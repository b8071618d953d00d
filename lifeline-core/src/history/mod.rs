//! Per-user prediction history
//!
//! The engine only ever appends; listing is for presentation layers.

mod error;
mod memory;
mod migrations;
mod recorder;
mod sqlite;
mod types;

pub use error::HistoryError;
pub use memory::MemoryHistoryRecorder;
pub use recorder::HistoryRecorder;
pub use sqlite::SqliteHistoryRecorder;
pub use types::HistoryEntry;
