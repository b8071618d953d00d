//! Core history types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::symptom::SymptomSet;

/// One concluded diagnosis in a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Final diagnosis name
    pub diagnosis: String,
    /// Confirmed symptoms at conclusion, in the order they were reported
    pub symptoms: SymptomSet,
    /// When the diagnosis was recorded
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time
    pub fn now(diagnosis: impl Into<String>, symptoms: SymptomSet) -> Self {
        Self {
            diagnosis: diagnosis.into(),
            symptoms,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_entry_now() {
        let symptoms: SymptomSet = ["fever", "cough"].into_iter().collect();
        let entry = HistoryEntry::now("Flu", symptoms.clone());
        assert_eq!(entry.diagnosis, "Flu");
        assert_eq!(entry.symptoms, symptoms);
        assert!(entry.timestamp <= Utc::now());
    }

    #[test]
    fn test_history_entry_serializes_symptoms_as_list() {
        let entry = HistoryEntry::now("Flu", ["fever", "cough"].into_iter().collect());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["symptoms"], serde_json::json!(["fever", "cough"]));
        assert_eq!(json["diagnosis"], "Flu");
    }
}
