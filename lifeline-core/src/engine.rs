//! Refinement engine
//!
//! Drives one diagnostic conversation per session: classify the confirmed
//! symptoms, then ask a follow-up, conclude, or escalate. The engine is the
//! only writer of session state. Every turn runs under the session's mutex
//! and works on a copy that is committed only once the classifier has
//! answered, so a failed call leaves the session exactly as it was.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::{CandidateDiagnosis, Classifier, Prediction};
use crate::config::RefinementConfig;
use crate::error::{ClassifierError, RefinementError};
use crate::history::HistoryRecorder;
use crate::session::{Answer, RefinementSession, SessionSnapshot, SessionStore};
use crate::symptom::{Symptom, SymptomSet};

/// Shown to the user whenever a session escalates
pub const ESCALATION_NOTICE: &str = "We could not reach a confident diagnosis from these symptoms. \
     Please continue with the assistant for further help.";

/// Outcome of one engine operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefinementResult {
    /// Ambiguous; answer `question` to continue
    NeedsMoreInfo {
        candidates: Vec<CandidateDiagnosis>,
        question: Symptom,
        /// 1-based number of this question
        round: u32,
        max_rounds: u32,
    },
    Concluded {
        diagnosis: String,
    },
    Escalated {
        best_guess: Option<String>,
        #[serde(default = "escalation_notice")]
        notice: String,
    },
}

fn escalation_notice() -> String {
    ESCALATION_NOTICE.to_string()
}

impl RefinementResult {
    pub fn escalated(best_guess: Option<String>) -> Self {
        Self::Escalated {
            best_guess,
            notice: escalation_notice(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::NeedsMoreInfo { .. })
    }
}

/// Result paired with the session it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementReply {
    pub session_id: String,
    pub result: RefinementResult,
}

/// The refinement state machine
pub struct RefinementEngine {
    classifier: Arc<dyn Classifier>,
    history: Arc<dyn HistoryRecorder>,
    store: Arc<SessionStore>,
    config: RefinementConfig,
}

impl RefinementEngine {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        history: Arc<dyn HistoryRecorder>,
        store: Arc<SessionStore>,
        config: RefinementConfig,
    ) -> Self {
        Self {
            classifier,
            history,
            store,
            config,
        }
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    pub fn history(&self) -> &Arc<dyn HistoryRecorder> {
        &self.history
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn config(&self) -> &RefinementConfig {
        &self.config
    }

    /// Begin a session for `user_id` from an initial symptom set
    ///
    /// The session is stored only if the classifier answers; on failure the
    /// caller retries the start.
    pub async fn start_session(
        &self,
        user_id: &str,
        symptoms: SymptomSet,
    ) -> Result<RefinementReply, RefinementError> {
        if symptoms.is_empty() {
            return Err(RefinementError::EmptyInput);
        }

        let id = Uuid::new_v4().to_string();
        let mut session = RefinementSession::new(&id, user_id, symptoms, self.config.max_rounds);
        info!(
            session_id = %id,
            user_id,
            symptoms = session.confirmed_symptoms().len(),
            "Starting refinement session"
        );

        let prediction = self.classify(&session).await?;
        let result = self.interpret(&mut session, prediction).await;

        if !session.is_terminal() || self.config.retain_terminal {
            self.store.put(session).await;
        }
        Ok(RefinementReply {
            session_id: id,
            result,
        })
    }

    /// Answer the pending question of a session
    pub async fn answer_question(
        &self,
        session_id: &str,
        answer: Answer,
    ) -> Result<RefinementReply, RefinementError> {
        let handle = self
            .store
            .get(session_id)
            .await
            .ok_or_else(|| RefinementError::absent(session_id))?;
        let mut guard = handle.lock().await;
        // Purged or replaced while waiting for the lock
        if !self.store.holds(session_id, &handle).await {
            return Err(RefinementError::absent(session_id));
        }

        let mut working = guard.clone();
        let question = working.record_answer(answer)?;
        debug!(
            session_id,
            question = %question,
            ?answer,
            round = working.round(),
            "Recorded answer"
        );

        let prediction = self.classify(&working).await?;
        let result = if working.rounds_exhausted() {
            self.force_decision(&mut working, prediction).await
        } else {
            self.interpret(&mut working, prediction).await
        };

        let terminal = working.is_terminal();
        *guard = working;
        drop(guard);

        if terminal && !self.config.retain_terminal {
            self.store.delete(session_id).await;
        }
        Ok(RefinementReply {
            session_id: session_id.to_string(),
            result,
        })
    }

    /// Read-only view of a stored session
    pub async fn session(&self, session_id: &str) -> Option<SessionSnapshot> {
        self.store.snapshot(session_id).await
    }

    /// Drop sessions idle past the configured timeout
    pub async fn purge_idle(&self) -> usize {
        let removed = self.store.purge_idle(self.config.idle_timeout()).await;
        if removed > 0 {
            info!(removed, "Purged idle refinement sessions");
        }
        removed
    }

    pub async fn active_sessions(&self) -> usize {
        self.store.len().await
    }

    async fn classify(&self, session: &RefinementSession) -> Result<Prediction, RefinementError> {
        let call = self
            .classifier
            .predict(session.confirmed_symptoms(), session.asked_symptoms());
        let prediction = match self.config.classifier_timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ClassifierError::Timeout(limit))??,
            None => call.await?,
        };
        debug!(
            session_id = session.id(),
            candidates = prediction.candidates.len(),
            follow_ups = prediction.follow_ups.len(),
            escalate = prediction.escalate,
            "Classifier responded"
        );
        Ok(prediction)
    }

    /// Apply the per-round decision policy
    async fn interpret(
        &self,
        session: &mut RefinementSession,
        prediction: Prediction,
    ) -> RefinementResult {
        if prediction.escalate {
            let best_guess = prediction.top().map(|c| c.name.clone());
            return self.escalate(session, best_guess);
        }

        let candidates = prediction.ranked();
        let Some(top) = candidates.first().map(|c| c.name.clone()) else {
            return self.escalate(session, None);
        };
        if candidates.len() == 1 {
            return self.conclude(session, top).await;
        }

        let question = prediction
            .next_question(session.confirmed_symptoms(), session.asked_symptoms())
            .filter(|q| session.can_ask(q))
            .cloned();
        match question {
            Some(question) => {
                debug!(session_id = session.id(), question = %question, "Asking follow-up");
                session.ask(question.clone());
                RefinementResult::NeedsMoreInfo {
                    candidates,
                    question,
                    round: session.round() + 1,
                    max_rounds: session.max_rounds(),
                }
            }
            None => self.conclude(session, top).await,
        }
    }

    /// Final decision once the round cap is reached
    async fn force_decision(
        &self,
        session: &mut RefinementSession,
        prediction: Prediction,
    ) -> RefinementResult {
        match prediction.top() {
            Some(top) => {
                let diagnosis = top.name.clone();
                debug!(session_id = session.id(), %diagnosis, "Round cap reached, taking top candidate");
                self.conclude(session, diagnosis).await
            }
            None => self.escalate(session, None),
        }
    }

    async fn conclude(&self, session: &mut RefinementSession, diagnosis: String) -> RefinementResult {
        session.conclude(diagnosis.clone());
        info!(session_id = session.id(), %diagnosis, rounds = session.round(), "Session concluded");

        if let Err(e) = self
            .history
            .append(session.user_id(), &diagnosis, session.confirmed_symptoms())
            .await
        {
            warn!(session_id = session.id(), error = %e, "Failed to record diagnosis history");
        }
        RefinementResult::Concluded { diagnosis }
    }

    fn escalate(&self, session: &mut RefinementSession, best_guess: Option<String>) -> RefinementResult {
        info!(session_id = session.id(), ?best_guess, "Session escalated");
        session.escalate(best_guess.clone());
        RefinementResult::escalated(best_guess)
    }
}
