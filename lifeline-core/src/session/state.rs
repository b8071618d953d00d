//! Refinement session struct and state machine
//!
//! A session accumulates the symptoms of one diagnostic conversation. Only
//! the engine mutates it; the classifier and history recorder never see it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RefinementError;
use crate::symptom::{Symptom, SymptomSet};

/// State of a refinement session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No question outstanding; awaiting the next classification
    Init,
    /// A follow-up question is outstanding
    AwaitingAnswer { question: Symptom },
    /// Terminal: a single diagnosis was reached
    Concluded { diagnosis: String },
    /// Terminal: routed to the fallback assistant
    Escalated { best_guess: Option<String> },
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Concluded { .. } | Self::Escalated { .. })
    }

    /// Short lowercase name for logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::AwaitingAnswer { .. } => "awaiting_answer",
            Self::Concluded { .. } => "concluded",
            Self::Escalated { .. } => "escalated",
        }
    }
}

/// A yes/no answer to the pending question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

impl From<bool> for Answer {
    fn from(confirmed: bool) -> Self {
        if confirmed { Self::Yes } else { Self::No }
    }
}

/// State of one diagnostic conversation
///
/// Invariants:
/// - `confirmed` is a superset of `initial` and only grows
/// - `round` never exceeds `max_rounds`
/// - a pending question is never confirmed or previously asked
#[derive(Debug, Clone)]
pub struct RefinementSession {
    id: String,
    user_id: String,
    initial: SymptomSet,
    confirmed: SymptomSet,
    /// Every symptom ever asked, whatever the answer
    asked: SymptomSet,
    round: u32,
    max_rounds: u32,
    state: SessionState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RefinementSession {
    /// Create a session from the user's initial symptoms
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        initial: SymptomSet,
        max_rounds: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            user_id: user_id.into(),
            confirmed: initial.clone(),
            initial,
            asked: SymptomSet::new(),
            round: 0,
            max_rounds,
            state: SessionState::Init,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn initial_symptoms(&self) -> &SymptomSet {
        &self.initial
    }

    pub fn confirmed_symptoms(&self) -> &SymptomSet {
        &self.confirmed
    }

    /// Symptoms already asked about (confirmed or declined)
    pub fn asked_symptoms(&self) -> &SymptomSet {
        &self.asked
    }

    /// Asked symptoms the user said no to
    pub fn declined_symptoms(&self) -> SymptomSet {
        self.asked.difference(&self.confirmed)
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn pending_question(&self) -> Option<&Symptom> {
        match &self.state {
            SessionState::AwaitingAnswer { question } => Some(question),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// True once the round cap forces a terminal decision
    pub fn rounds_exhausted(&self) -> bool {
        self.round >= self.max_rounds
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Outstanding question may only be a never-asked, unconfirmed symptom
    pub fn can_ask(&self, symptom: &Symptom) -> bool {
        !self.is_terminal()
            && !self.rounds_exhausted()
            && !self.confirmed.contains(symptom)
            && !self.asked.contains(symptom)
    }

    pub(crate) fn ask(&mut self, question: Symptom) {
        debug_assert!(self.can_ask(&question));
        self.state = SessionState::AwaitingAnswer { question };
        self.touch();
    }

    /// Apply an answer to the pending question
    ///
    /// Returns the symptom that was answered. Fails without changing state
    /// if the session is terminal or has no pending question.
    pub(crate) fn record_answer(&mut self, answer: Answer) -> Result<Symptom, RefinementError> {
        if self.is_terminal() {
            return Err(RefinementError::InvalidState {
                session_id: self.id.clone(),
                state: self.state.name().to_string(),
            });
        }
        let question = match &self.state {
            SessionState::AwaitingAnswer { question } => question.clone(),
            _ => return Err(RefinementError::NoPendingQuestion(self.id.clone())),
        };

        self.round += 1;
        if answer == Answer::Yes {
            self.confirmed.insert(question.clone());
        }
        self.asked.insert(question.clone());
        self.state = SessionState::Init;
        self.touch();
        Ok(question)
    }

    pub(crate) fn conclude(&mut self, diagnosis: String) {
        self.state = SessionState::Concluded { diagnosis };
        self.touch();
    }

    pub(crate) fn escalate(&mut self, best_guess: Option<String>) {
        self.state = SessionState::Escalated { best_guess };
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Read-only view for display
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            initial_symptoms: self.initial.clone(),
            confirmed_symptoms: self.confirmed.clone(),
            declined_symptoms: self.declined_symptoms(),
            round: self.round,
            max_rounds: self.max_rounds,
            state: self.state.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub user_id: String,
    pub initial_symptoms: SymptomSet,
    pub confirmed_symptoms: SymptomSet,
    pub declined_symptoms: SymptomSet,
    pub round: u32,
    pub max_rounds: u32,
    #[serde(flatten)]
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RefinementSession {
        let initial: SymptomSet = ["fever"].into_iter().collect();
        RefinementSession::new("s1", "alice", initial, 3)
    }

    // ==================== SessionState Tests ====================

    #[test]
    fn terminal_states() {
        assert!(!SessionState::Init.is_terminal());
        assert!(
            !SessionState::AwaitingAnswer {
                question: "chills".into()
            }
            .is_terminal()
        );
        assert!(
            SessionState::Concluded {
                diagnosis: "Flu".into()
            }
            .is_terminal()
        );
        assert!(SessionState::Escalated { best_guess: None }.is_terminal());
    }

    #[test]
    fn session_state_serializes_tagged() {
        let state = SessionState::AwaitingAnswer {
            question: "chills".into(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "awaiting_answer");
        assert_eq!(json["question"], "chills");
    }

    #[test]
    fn answer_parses_lowercase() {
        let yes: Answer = serde_json::from_str("\"yes\"").unwrap();
        assert_eq!(yes, Answer::Yes);
        assert_eq!(Answer::from(false), Answer::No);
    }

    // ==================== Creation Tests ====================

    #[test]
    fn new_session_starts_in_init() {
        let session = session();
        assert_eq!(session.state(), &SessionState::Init);
        assert_eq!(session.round(), 0);
        assert_eq!(session.confirmed_symptoms(), session.initial_symptoms());
        assert!(session.pending_question().is_none());
    }

    // ==================== Answer Tests ====================

    #[test]
    fn yes_answer_confirms_question() {
        let mut session = session();
        session.ask("chills".into());

        let answered = session.record_answer(Answer::Yes).unwrap();

        assert_eq!(answered.as_str(), "chills");
        assert_eq!(session.round(), 1);
        assert!(session.confirmed_symptoms().contains(&"chills".into()));
        assert!(session.asked_symptoms().contains(&"chills".into()));
        assert!(session.pending_question().is_none());
        assert!(session.declined_symptoms().is_empty());
    }

    #[test]
    fn no_answer_records_decline_only() {
        let mut session = session();
        session.ask("chills".into());

        session.record_answer(Answer::No).unwrap();

        assert_eq!(session.round(), 1);
        assert!(!session.confirmed_symptoms().contains(&"chills".into()));
        assert!(session.declined_symptoms().contains(&"chills".into()));
        assert!(!session.can_ask(&"chills".into()));
    }

    #[test]
    fn answer_without_question_fails_unchanged() {
        let mut session = session();
        let result = session.record_answer(Answer::Yes);

        assert!(matches!(result, Err(RefinementError::NoPendingQuestion(_))));
        assert_eq!(session.round(), 0);
    }

    #[test]
    fn answer_on_terminal_session_is_invalid_state() {
        let mut session = session();
        session.conclude("Flu".into());

        let result = session.record_answer(Answer::Yes);

        assert!(matches!(
            result,
            Err(RefinementError::InvalidState { ref state, .. }) if state == "concluded"
        ));
        assert_eq!(session.round(), 0);
    }

    #[test]
    fn cannot_ask_confirmed_symptom() {
        let session = session();
        assert!(!session.can_ask(&"fever".into()));
        assert!(session.can_ask(&"chills".into()));
    }

    #[test]
    fn cannot_ask_after_rounds_exhausted() {
        let initial: SymptomSet = ["fever"].into_iter().collect();
        let session = RefinementSession::new("s0", "alice", initial, 0);
        assert!(session.rounds_exhausted());
        assert!(!session.can_ask(&"chills".into()));
    }

    // ==================== Snapshot Tests ====================

    #[test]
    fn snapshot_flattens_state() {
        let mut session = session();
        session.ask("chills".into());

        let json = serde_json::to_value(session.snapshot()).unwrap();

        assert_eq!(json["id"], "s1");
        assert_eq!(json["state"], "awaiting_answer");
        assert_eq!(json["question"], "chills");
        assert_eq!(json["confirmed_symptoms"], serde_json::json!(["fever"]));
    }
}
