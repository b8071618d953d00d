//! Rule-based classifier over a disease -> symptoms table
//!
//! Candidates are the diseases that explain the most confirmed symptoms
//! without contradicting a declined one. Follow-up questions are the
//! symptoms that split the remaining candidates most evenly.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{CandidateDiagnosis, Classifier, Prediction, rank};
use crate::error::ClassifierError;
use crate::symptom::{Symptom, SymptomSet};

const BUILTIN_TABLE: &str = include_str!("../../data/symptom_map.toml");

/// Maximum follow-up questions proposed per prediction
pub const MAX_FOLLOW_UPS: usize = 3;

#[derive(Debug, Clone, Deserialize)]
struct DiseaseEntry {
    name: String,
    symptoms: Vec<Symptom>,
}

#[derive(Debug, Deserialize)]
struct SymptomTable {
    #[serde(default)]
    disease: Vec<DiseaseEntry>,
}

/// Classifier backed by a static disease table
#[derive(Debug, Clone)]
pub struct SymptomMapClassifier {
    diseases: Vec<DiseaseEntry>,
}

impl SymptomMapClassifier {
    /// Parse a TOML table of `[[disease]]` entries
    pub fn from_toml_str(contents: &str) -> Result<Self, ClassifierError> {
        let table: SymptomTable =
            toml::from_str(contents).map_err(|e| ClassifierError::Data(e.to_string()))?;
        Self::validate(&table.disease)?;
        Ok(Self {
            diseases: table.disease,
        })
    }

    /// Load a table from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ClassifierError::Data(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// The demonstration table shipped with the crate
    pub fn builtin() -> Result<Self, ClassifierError> {
        Self::from_toml_str(BUILTIN_TABLE)
    }

    pub fn disease_count(&self) -> usize {
        self.diseases.len()
    }

    fn validate(diseases: &[DiseaseEntry]) -> Result<(), ClassifierError> {
        if diseases.is_empty() {
            return Err(ClassifierError::Data("table has no diseases".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for disease in diseases {
            if disease.name.trim().is_empty() {
                return Err(ClassifierError::Data("disease with empty name".into()));
            }
            if disease.symptoms.is_empty() {
                return Err(ClassifierError::Data(format!(
                    "disease '{}' has no symptoms",
                    disease.name
                )));
            }
            if !seen.insert(disease.name.as_str()) {
                return Err(ClassifierError::Data(format!(
                    "duplicate disease '{}'",
                    disease.name
                )));
            }
        }
        Ok(())
    }

    /// Synchronous core of `predict`
    pub fn evaluate(&self, symptoms: &SymptomSet, excluded: &SymptomSet) -> Prediction {
        let declined = excluded.difference(symptoms);

        let matching: Vec<(&DiseaseEntry, usize)> = self
            .diseases
            .iter()
            .map(|d| (d, d.symptoms.iter().filter(|s| symptoms.contains(s)).count()))
            .filter(|(_, matched)| *matched > 0)
            .collect();

        if matching.is_empty() {
            return Prediction::escalate(None);
        }

        let consistent: Vec<_> = matching
            .iter()
            .filter(|(d, _)| !d.symptoms.iter().any(|s| declined.contains(s)))
            .cloned()
            .collect();
        let pool = if consistent.is_empty() {
            matching
        } else {
            consistent
        };

        let best = pool.iter().map(|(_, m)| *m).max().unwrap_or(0);
        let remaining: Vec<&DiseaseEntry> = pool
            .into_iter()
            .filter(|(_, m)| *m == best)
            .map(|(d, _)| d)
            .collect();

        let candidates = rank(
            remaining
                .iter()
                .map(|d| CandidateDiagnosis::new(&d.name, best as f64 / d.symptoms.len() as f64))
                .collect(),
        );

        if candidates.len() == 1 {
            return Prediction {
                candidates,
                ..Default::default()
            };
        }

        let follow_ups = Self::discriminating(&remaining, symptoms, excluded);
        Prediction::ambiguous(candidates, follow_ups)
    }

    /// Unasked symptoms ordered by how evenly they split `diseases`
    fn discriminating(
        diseases: &[&DiseaseEntry],
        symptoms: &SymptomSet,
        excluded: &SymptomSet,
    ) -> Vec<Symptom> {
        let total = diseases.len();
        let mut order: Vec<Symptom> = Vec::new();
        let mut counts: HashMap<&Symptom, usize> = HashMap::new();

        for disease in diseases {
            for symptom in &disease.symptoms {
                if symptoms.contains(symptom) || excluded.contains(symptom) {
                    continue;
                }
                let count = counts.entry(symptom).or_insert(0);
                if *count == 0 {
                    order.push(symptom.clone());
                }
                *count += 1;
            }
        }

        // A symptom shared by every candidate tells them apart from nothing
        order.retain(|s| counts.get(s).copied().unwrap_or(0) < total);
        order.sort_by_key(|s| {
            let count = counts.get(s).copied().unwrap_or(0);
            (2 * count).abs_diff(total)
        });
        order.truncate(MAX_FOLLOW_UPS);
        order
    }
}

#[async_trait]
impl Classifier for SymptomMapClassifier {
    async fn predict(
        &self,
        symptoms: &SymptomSet,
        excluded: &SymptomSet,
    ) -> Result<Prediction, ClassifierError> {
        Ok(self.evaluate(symptoms, excluded))
    }

    async fn vocabulary(&self) -> Result<Vec<Symptom>, ClassifierError> {
        let all: SymptomSet = self
            .diseases
            .iter()
            .flat_map(|d| d.symptoms.iter().cloned())
            .collect();
        Ok(all.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> SymptomSet {
        items.iter().copied().collect()
    }

    fn names(prediction: &Prediction) -> Vec<&str> {
        prediction
            .candidates
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    fn classifier() -> SymptomMapClassifier {
        SymptomMapClassifier::builtin().unwrap()
    }

    // ==================== Loading Tests ====================

    #[test]
    fn builtin_table_loads() {
        assert_eq!(classifier().disease_count(), 8);
    }

    #[test]
    fn empty_table_is_rejected() {
        let result = SymptomMapClassifier::from_toml_str("");
        assert!(matches!(result, Err(ClassifierError::Data(_))));
    }

    #[test]
    fn duplicate_disease_is_rejected() {
        let toml = r#"
[[disease]]
name = "Flu"
symptoms = ["fever"]

[[disease]]
name = "Flu"
symptoms = ["cough"]
"#;
        let err = SymptomMapClassifier::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn disease_without_symptoms_is_rejected() {
        let toml = "[[disease]]\nname = \"Flu\"\nsymptoms = []\n";
        assert!(SymptomMapClassifier::from_toml_str(toml).is_err());
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.toml");
        std::fs::write(&path, "[[disease]]\nname = \"Flu\"\nsymptoms = [\"fever\"]\n").unwrap();

        let classifier = SymptomMapClassifier::from_path(&path).unwrap();
        assert_eq!(classifier.disease_count(), 1);
    }

    #[test]
    fn from_path_missing_file_is_data_error() {
        let result = SymptomMapClassifier::from_path("/nonexistent/table.toml");
        assert!(matches!(result, Err(ClassifierError::Data(_))));
    }

    // ==================== Evaluation Tests ====================

    #[test]
    fn unique_best_match_is_single_diagnosis() {
        let prediction = classifier().evaluate(&set(&["itching", "skin_rash"]), &set(&[]));
        assert_eq!(names(&prediction), vec!["Fungal Infection"]);
        assert!(prediction.follow_ups.is_empty());
        assert!(!prediction.escalate);
    }

    #[test]
    fn tied_matches_ask_discriminating_questions() {
        let prediction = classifier().evaluate(&set(&["high_fever"]), &set(&[]));

        assert_eq!(names(&prediction), vec!["Influenza", "Malaria"]);
        // chills, muscle_pain and headache are shared by both and skipped
        let follow_ups: Vec<_> = prediction.follow_ups.iter().map(Symptom::as_str).collect();
        assert_eq!(follow_ups, vec!["cough", "fatigue", "sweating"]);
    }

    #[test]
    fn confirmed_follow_up_narrows_to_one() {
        let prediction = classifier().evaluate(&set(&["high_fever", "cough"]), &set(&["cough"]));
        assert_eq!(names(&prediction), vec!["Influenza"]);
    }

    #[test]
    fn declined_follow_up_eliminates_candidate() {
        let prediction = classifier().evaluate(&set(&["high_fever"]), &set(&["cough"]));
        assert_eq!(names(&prediction), vec!["Malaria"]);
    }

    #[test]
    fn declines_that_eliminate_everything_are_ignored() {
        let prediction =
            classifier().evaluate(&set(&["high_fever"]), &set(&["cough", "sweating"]));
        assert_eq!(names(&prediction), vec!["Influenza", "Malaria"]);
    }

    #[test]
    fn follow_ups_never_include_symptoms_or_excluded() {
        let symptoms = set(&["high_fever"]);
        let excluded = set(&["fatigue"]);
        let prediction = classifier().evaluate(&symptoms, &excluded);

        assert!(prediction.follow_ups.len() <= MAX_FOLLOW_UPS);
        for symptom in &prediction.follow_ups {
            assert!(!symptoms.contains(symptom));
            assert!(!excluded.contains(symptom));
        }
    }

    #[test]
    fn unmatched_symptoms_escalate() {
        let prediction = classifier().evaluate(&set(&["unknown_symptom"]), &set(&[]));
        assert!(prediction.escalate);
        assert!(prediction.candidates.is_empty());
    }

    #[test]
    fn scores_are_coverage_fractions() {
        let prediction = classifier().evaluate(&set(&["nausea"]), &set(&[]));
        // Migraine has 4 symptoms, Gastroenteritis 5
        assert_eq!(names(&prediction), vec!["Migraine", "Gastroenteritis"]);
        assert!((prediction.candidates[0].score.0 - 0.25).abs() < f64::EPSILON);
    }

    // ==================== Trait Tests ====================

    #[tokio::test]
    async fn vocabulary_is_deduplicated_union() {
        let vocabulary = classifier().vocabulary().await.unwrap();
        let cough = vocabulary.iter().filter(|s| s.as_str() == "cough").count();
        assert_eq!(cough, 1);
        assert_eq!(vocabulary[0].as_str(), "continuous_sneezing");
    }

    #[tokio::test]
    async fn predict_matches_evaluate() {
        let classifier = classifier();
        let symptoms = set(&["headache", "nausea"]);
        let predicted = classifier.predict(&symptoms, &set(&[])).await.unwrap();
        assert_eq!(predicted, classifier.evaluate(&symptoms, &set(&[])));
        assert_eq!(names(&predicted), vec!["Migraine"]);
    }
}
