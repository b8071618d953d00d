//! Classifier backed by a remote model service
//!
//! Speaks the model service's JSON API:
//! - `POST {base}/predict` with `{symptoms, excluded}`
//! - `GET {base}/get_symptoms` returning `{symptoms: [...]}`
//!
//! Responses may carry an explicit `candidates` list or the legacy shapes
//! `{disease}`, `{possible_diseases, ask_more_symptoms}` and
//! `{chatbot_suggested}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::traits::{CandidateDiagnosis, Classifier, Prediction};
use crate::error::ClassifierError;
use crate::symptom::{Symptom, SymptomSet};

/// Default request timeout for the model service
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    symptoms: &'a SymptomSet,
    excluded: &'a SymptomSet,
}

#[derive(Debug, Default, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    candidates: Option<Vec<CandidateDiagnosis>>,
    #[serde(default)]
    disease: Option<String>,
    #[serde(default)]
    possible_diseases: Option<Vec<String>>,
    #[serde(default, alias = "follow_ups")]
    ask_more_symptoms: Option<Vec<Symptom>>,
    #[serde(default, alias = "escalate")]
    chatbot_suggested: bool,
    #[serde(default)]
    error: Option<String>,
}

impl PredictResponse {
    fn into_prediction(
        self,
        symptoms: &SymptomSet,
        excluded: &SymptomSet,
    ) -> Result<Prediction, ClassifierError> {
        if let Some(error) = self.error {
            return Err(ClassifierError::Malformed(error));
        }

        let candidates = match (self.candidates, self.disease, self.possible_diseases) {
            (Some(candidates), _, _) => candidates,
            (None, _, Some(possible)) if !possible.is_empty() => positional(possible),
            (None, Some(disease), _) => vec![CandidateDiagnosis::new(disease, 1.0)],
            (None, None, _) if self.chatbot_suggested => Vec::new(),
            _ => {
                return Err(ClassifierError::Malformed(
                    "response has no candidates, disease or escalation".into(),
                ));
            }
        };

        let follow_ups = self
            .ask_more_symptoms
            .unwrap_or_default()
            .into_iter()
            .filter(|s| {
                let allowed = !symptoms.contains(s) && !excluded.contains(s);
                if !allowed {
                    tracing::debug!(symptom = %s, "Ignoring follow-up already known to session");
                }
                allowed
            })
            .collect();

        Ok(Prediction {
            candidates,
            follow_ups,
            escalate: self.chatbot_suggested,
        })
    }
}

/// Synthesize descending scores so list order is kept as rank order
fn positional(names: Vec<String>) -> Vec<CandidateDiagnosis> {
    let n = names.len() as f64;
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| CandidateDiagnosis::new(name, (n - i as f64) / n))
        .collect()
}

#[derive(Debug, Deserialize)]
struct VocabularyResponse {
    symptoms: Vec<Symptom>,
}

/// HTTP client for an external model service
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpClassifier {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_transport(&self, error: reqwest::Error) -> ClassifierError {
        if error.is_timeout() {
            ClassifierError::Timeout(self.timeout)
        } else if error.is_decode() {
            ClassifierError::Malformed(error.to_string())
        } else {
            ClassifierError::Unavailable(error.to_string())
        }
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClassifierError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(ClassifierError::Unavailable(format!("{}: {}", status, body)))
        } else {
            Err(ClassifierError::Malformed(format!("{}: {}", status, body)))
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn predict(
        &self,
        symptoms: &SymptomSet,
        excluded: &SymptomSet,
    ) -> Result<Prediction, ClassifierError> {
        let url = format!("{}/predict", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PredictRequest { symptoms, excluded })
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        let response = self.check_status(response).await?;
        let body: PredictResponse = response.json().await.map_err(|e| self.map_transport(e))?;
        body.into_prediction(symptoms, excluded)
    }

    async fn vocabulary(&self) -> Result<Vec<Symptom>, ClassifierError> {
        let url = format!("{}/get_symptoms", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        let response = self.check_status(response).await?;
        let body: VocabularyResponse = response.json().await.map_err(|e| self.map_transport(e))?;
        Ok(body.symptoms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> SymptomSet {
        items.iter().copied().collect()
    }

    fn parse(json: &str) -> Result<Prediction, ClassifierError> {
        let response: PredictResponse = serde_json::from_str(json).unwrap();
        response.into_prediction(&set(&["fever"]), &set(&["cough"]))
    }

    // ==================== Response Mapping Tests ====================

    #[test]
    fn single_disease_maps_to_one_candidate() {
        let prediction = parse(r#"{"disease":"Flu"}"#).unwrap();
        assert_eq!(prediction, Prediction::single("Flu", 1.0));
    }

    #[test]
    fn possible_diseases_keep_list_order() {
        let prediction = parse(
            r#"{"possible_diseases":["Flu","Cold","Allergy"],"ask_more_symptoms":["chills"]}"#,
        )
        .unwrap();

        let ranked = prediction.ranked();
        let names: Vec<_> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Flu", "Cold", "Allergy"]);
        assert_eq!(prediction.follow_ups, vec![Symptom::from("chills")]);
    }

    #[test]
    fn possible_diseases_take_precedence_over_disease() {
        let prediction =
            parse(r#"{"disease":"Flu","possible_diseases":["Flu","Cold"]}"#).unwrap();
        assert_eq!(prediction.candidates.len(), 2);
    }

    #[test]
    fn explicit_candidates_are_used_verbatim() {
        let prediction = parse(
            r#"{"candidates":[{"name":"Cold","score":0.3},{"name":"Flu","score":0.6}],"follow_ups":["chills"]}"#,
        )
        .unwrap();
        assert_eq!(prediction.candidates[0].name, "Cold");
        assert_eq!(prediction.top().unwrap().name, "Flu");
        assert_eq!(prediction.follow_ups.len(), 1);
    }

    #[test]
    fn chatbot_suggestion_escalates_without_candidates() {
        let prediction = parse(r#"{"chatbot_suggested":true,"message":"use chatbot"}"#).unwrap();
        assert!(prediction.escalate);
        assert!(prediction.candidates.is_empty());
    }

    #[test]
    fn escalation_keeps_best_guess() {
        let prediction = parse(r#"{"escalate":true,"disease":"Flu"}"#).unwrap();
        assert!(prediction.escalate);
        assert_eq!(prediction.top().unwrap().name, "Flu");
    }

    #[test]
    fn error_body_is_malformed() {
        let result = parse(r#"{"error":"No valid symptoms provided."}"#);
        assert!(matches!(result, Err(ClassifierError::Malformed(m)) if m.contains("No valid")));
    }

    #[test]
    fn empty_body_is_malformed() {
        assert!(matches!(parse("{}"), Err(ClassifierError::Malformed(_))));
    }

    #[test]
    fn follow_ups_violating_contract_are_dropped() {
        let prediction = parse(
            r#"{"possible_diseases":["Flu","Cold"],"ask_more_symptoms":["fever","cough","chills"]}"#,
        )
        .unwrap();
        assert_eq!(prediction.follow_ups, vec![Symptom::from("chills")]);
    }

    // ==================== Client Tests ====================

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let classifier = HttpClassifier::new("http://localhost:5000/api/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(classifier.base_url(), "http://localhost:5000/api");
    }

    #[tokio::test]
    async fn unreachable_service_is_unavailable() {
        // Port 9 (discard) on localhost is closed in test environments
        let classifier =
            HttpClassifier::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result = classifier.predict(&set(&["fever"]), &set(&[])).await;
        assert!(matches!(
            result,
            Err(ClassifierError::Unavailable(_)) | Err(ClassifierError::Timeout(_))
        ));
    }
}
