//! Classifier trait and prediction types
//!
//! The classifier is an opaque scorer: given the confirmed symptoms and the
//! questions already asked, it ranks candidate diagnoses and may propose
//! follow-up symptoms to ask about. The engine never recomputes scores.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::symptom::{Symptom, SymptomSet};

/// Classifier-defined confidence score; higher is more likely
///
/// Totally ordered via `f64::total_cmp`, so NaN sorts deterministically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(pub f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A ranked diagnosis offered by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDiagnosis {
    pub name: String,
    pub score: Score,
}

impl CandidateDiagnosis {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score: Score(score),
        }
    }
}

/// Sort candidates descending by score
///
/// The sort is stable, so ties keep the classifier's original order.
pub fn rank(mut candidates: Vec<CandidateDiagnosis>) -> Vec<CandidateDiagnosis> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

/// Output of one classifier invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Candidates above the classifier's confidence bar
    pub candidates: Vec<CandidateDiagnosis>,
    /// Discriminating follow-up symptoms, most useful first
    #[serde(default)]
    pub follow_ups: Vec<Symptom>,
    /// Low confidence: route the user to the fallback assistant
    #[serde(default)]
    pub escalate: bool,
}

impl Prediction {
    /// A single confident diagnosis
    pub fn single(name: impl Into<String>, score: f64) -> Self {
        Self {
            candidates: vec![CandidateDiagnosis::new(name, score)],
            ..Default::default()
        }
    }

    /// Several candidates with follow-up questions
    pub fn ambiguous(
        candidates: Vec<CandidateDiagnosis>,
        follow_ups: impl IntoIterator<Item = Symptom>,
    ) -> Self {
        Self {
            candidates,
            follow_ups: follow_ups.into_iter().collect(),
            escalate: false,
        }
    }

    /// Explicit low-confidence signal, with an optional best guess
    pub fn escalate(best_guess: Option<CandidateDiagnosis>) -> Self {
        Self {
            candidates: best_guess.into_iter().collect(),
            follow_ups: Vec::new(),
            escalate: true,
        }
    }

    /// Candidates in rank order
    pub fn ranked(&self) -> Vec<CandidateDiagnosis> {
        rank(self.candidates.clone())
    }

    /// Highest-ranked candidate, first in classifier order on ties
    pub fn top(&self) -> Option<&CandidateDiagnosis> {
        // max_by would return the last of equal elements
        self.candidates
            .iter()
            .fold(None, |best: Option<&CandidateDiagnosis>, c| match best {
                Some(b) if b.score >= c.score => Some(b),
                _ => Some(c),
            })
    }

    /// First follow-up that is neither confirmed nor already asked
    pub fn next_question(&self, confirmed: &SymptomSet, asked: &SymptomSet) -> Option<&Symptom> {
        self.follow_ups
            .iter()
            .find(|s| !confirmed.contains(s) && !asked.contains(s))
    }
}

/// Trait for symptom classifiers
///
/// Implementations may call a remote model service or evaluate a local
/// table. They own no session state.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Rank candidate diagnoses for `symptoms`
    ///
    /// Must never propose a follow-up that is a member of `symptoms` or
    /// `excluded`.
    async fn predict(
        &self,
        symptoms: &SymptomSet,
        excluded: &SymptomSet,
    ) -> Result<Prediction, ClassifierError>;

    /// The fixed symptom vocabulary this classifier understands
    async fn vocabulary(&self) -> Result<Vec<Symptom>, ClassifierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Score Tests ====================

    #[test]
    fn score_orders_by_value() {
        assert!(Score(0.9) > Score(0.1));
        assert_eq!(Score(0.5), Score(0.5));
    }

    #[test]
    fn score_nan_is_totally_ordered() {
        let mut scores = vec![Score(f64::NAN), Score(1.0), Score(0.0)];
        scores.sort();
        assert_eq!(scores[0], Score(0.0));
        assert_eq!(scores[1], Score(1.0));
    }

    // ==================== Ranking Tests ====================

    #[test]
    fn rank_sorts_descending() {
        let ranked = rank(vec![
            CandidateDiagnosis::new("Cold", 0.2),
            CandidateDiagnosis::new("Flu", 0.7),
            CandidateDiagnosis::new("Allergy", 0.4),
        ]);
        let names: Vec<_> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Flu", "Allergy", "Cold"]);
    }

    #[test]
    fn rank_keeps_classifier_order_on_ties() {
        let ranked = rank(vec![
            CandidateDiagnosis::new("B", 0.5),
            CandidateDiagnosis::new("A", 0.5),
            CandidateDiagnosis::new("C", 0.9),
        ]);
        let names: Vec<_> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn top_prefers_first_on_ties() {
        let prediction = Prediction::ambiguous(
            vec![
                CandidateDiagnosis::new("First", 0.5),
                CandidateDiagnosis::new("Second", 0.5),
            ],
            [],
        );
        assert_eq!(prediction.top().unwrap().name, "First");
    }

    #[test]
    fn top_of_empty_prediction_is_none() {
        assert!(Prediction::default().top().is_none());
    }

    // ==================== Next Question Tests ====================

    #[test]
    fn next_question_skips_confirmed_and_asked() {
        let prediction = Prediction::ambiguous(
            vec![
                CandidateDiagnosis::new("Flu", 0.6),
                CandidateDiagnosis::new("Cold", 0.4),
            ],
            ["fever", "chills", "sneezing"].map(Symptom::from),
        );
        let confirmed: SymptomSet = ["fever"].into_iter().collect();
        let asked: SymptomSet = ["chills"].into_iter().collect();

        let next = prediction.next_question(&confirmed, &asked);
        assert_eq!(next, Some(&Symptom::from("sneezing")));
    }

    #[test]
    fn next_question_none_when_all_asked() {
        let prediction = Prediction::ambiguous(vec![], ["chills"].map(Symptom::from));
        let asked: SymptomSet = ["chills"].into_iter().collect();
        assert!(prediction.next_question(&SymptomSet::new(), &asked).is_none());
    }

    #[test]
    fn prediction_deserializes_without_optional_fields() {
        let prediction: Prediction =
            serde_json::from_str(r#"{"candidates":[{"name":"Flu","score":0.9}]}"#).unwrap();
        assert_eq!(prediction, Prediction::single("Flu", 0.9));
    }
}
