//! Interview practice sessions.
//!
//! A session is a plain value. Handlers load it, apply one transition and
//! save it back; nothing keeps session progress in memory between requests.
//! Every transition bumps `revision`, and a save only lands if the stored
//! revision is still the one that was loaded. A concurrent writer gets a 409.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::coaching::interview::InterviewQuestion;
use crate::errors::AppError;
use crate::models::session::PracticeSessionRow;

pub const MAX_ANSWER_CHARS: usize = 5_000;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("practice session is already complete")]
    Completed,
    #[error("answer cannot be empty")]
    EmptyAnswer,
    #[error("answer is longer than {} characters", MAX_ANSWER_CHARS)]
    AnswerTooLong,
    #[error("practice session needs at least one question")]
    NoQuestions,
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Validation(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Response {
    Answered(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeSession {
    pub questions: Vec<InterviewQuestion>,
    /// One entry per question already passed, in order.
    pub responses: Vec<Response>,
    pub current_index: usize,
    pub completed: bool,
    /// Number of transitions applied so far.
    #[serde(default)]
    pub revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub skipped: usize,
    pub remaining: usize,
    pub completed: bool,
}

impl PracticeSession {
    pub fn new(questions: Vec<InterviewQuestion>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        Ok(Self {
            questions,
            responses: Vec::new(),
            current_index: 0,
            completed: false,
            revision: 0,
        })
    }

    pub fn current_question(&self) -> Option<&InterviewQuestion> {
        if self.completed {
            return None;
        }
        self.questions.get(self.current_index)
    }

    pub fn record_answer(self, answer: &str) -> Result<Self, SessionError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(SessionError::EmptyAnswer);
        }
        if answer.chars().count() > MAX_ANSWER_CHARS {
            return Err(SessionError::AnswerTooLong);
        }
        self.advance(Response::Answered(answer.to_string()))
    }

    pub fn skip(self) -> Result<Self, SessionError> {
        self.advance(Response::Skipped)
    }

    fn advance(mut self, response: Response) -> Result<Self, SessionError> {
        if self.completed {
            return Err(SessionError::Completed);
        }
        self.responses.push(response);
        self.current_index += 1;
        self.completed = self.current_index >= self.questions.len();
        self.revision += 1;
        Ok(self)
    }

    pub fn progress(&self) -> SessionProgress {
        let answered = self
            .responses
            .iter()
            .filter(|r| matches!(r, Response::Answered(_)))
            .count();
        let skipped = self.responses.len() - answered;
        SessionProgress {
            total: self.questions.len(),
            answered,
            skipped,
            remaining: self.questions.len().saturating_sub(self.current_index),
            completed: self.completed,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

fn to_json(session: &PracticeSession) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(session)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize session: {e}")))
}

pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    session: &PracticeSession,
) -> Result<Uuid, AppError> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO practice_sessions (id, user_id, state) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(user_id)
        .bind(to_json(session)?)
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn load_session(
    pool: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<PracticeSession, AppError> {
    let row = sqlx::query_as::<_, PracticeSessionRow>(
        "SELECT * FROM practice_sessions WHERE id = $1 AND user_id = $2",
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Practice session {session_id} not found")))?;

    serde_json::from_value(row.state).map_err(|e| {
        AppError::Internal(anyhow::anyhow!(
            "Stored practice session {session_id} is corrupt: {e}"
        ))
    })
}

/// Writes `session` only if the stored copy is still at `expected_revision`.
pub async fn save_session(
    pool: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
    expected_revision: u64,
    session: &PracticeSession,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE practice_sessions
        SET state = $1, updated_at = now()
        WHERE id = $2 AND user_id = $3
          AND COALESCE((state->>'revision')::bigint, 0) = $4
        "#,
    )
    .bind(to_json(session)?)
    .bind(session_id)
    .bind(user_id)
    .bind(i64::try_from(expected_revision).unwrap_or(i64::MAX))
    .execute(pool)
    .await?;

    check_saved(result.rows_affected(), session_id)
}

/// The session was loaded just before the save, so a miss means another
/// request changed (or deleted) it in between.
fn check_saved(rows_affected: u64, session_id: Uuid) -> Result<(), AppError> {
    if rows_affected == 0 {
        return Err(AppError::Conflict(format!(
            "Practice session {session_id} was changed by another request; reload and retry"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(n: usize) -> PracticeSession {
        let questions = (0..n)
            .map(|i| InterviewQuestion {
                category: "technical".to_string(),
                question: format!("Question {i}?"),
                guidance: String::new(),
            })
            .collect();
        PracticeSession::new(questions).unwrap()
    }

    #[test]
    fn test_new_requires_questions() {
        assert_eq!(
            PracticeSession::new(Vec::new()).unwrap_err(),
            SessionError::NoQuestions
        );
    }

    #[test]
    fn test_answer_then_skip_completes() {
        let s = session(2).record_answer("  I would shard it  ").unwrap();
        assert_eq!(s.current_index, 1);
        assert_eq!(s.current_question().unwrap().question, "Question 1?");
        assert!(!s.completed);

        let s = s.skip().unwrap();
        assert!(s.completed);
        assert!(s.current_question().is_none());
        assert_eq!(s.responses[0], Response::Answered("I would shard it".to_string()));
        assert_eq!(s.responses[1], Response::Skipped);
    }

    #[test]
    fn test_completed_session_rejects_transitions() {
        let s = session(1).skip().unwrap();
        assert_eq!(s.clone().skip().unwrap_err(), SessionError::Completed);
        assert_eq!(s.record_answer("late").unwrap_err(), SessionError::Completed);
    }

    #[test]
    fn test_blank_answer_is_rejected_without_advancing() {
        let s = session(2);
        assert_eq!(s.clone().record_answer("   ").unwrap_err(), SessionError::EmptyAnswer);
        assert_eq!(s.current_index, 0);
    }

    #[test]
    fn test_overlong_answer_is_rejected() {
        let long = "a".repeat(MAX_ANSWER_CHARS + 1);
        assert_eq!(
            session(1).record_answer(&long).unwrap_err(),
            SessionError::AnswerTooLong
        );
    }

    #[test]
    fn test_progress_counts() {
        let s = session(4).record_answer("yes").unwrap().skip().unwrap();
        assert_eq!(
            s.progress(),
            SessionProgress {
                total: 4,
                answered: 1,
                skipped: 1,
                remaining: 2,
                completed: false,
            }
        );
    }

    #[test]
    fn test_state_survives_json_storage() {
        let s = session(3).record_answer("first").unwrap();
        let value = to_json(&s).unwrap();
        assert_eq!(value["responses"][0]["kind"], "answered");
        let back: PracticeSession = serde_json::from_value(value).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_revision_bumps_only_on_transition() {
        let s = session(3);
        assert_eq!(s.revision, 0);
        assert!(s.clone().record_answer("").is_err());
        let s = s.record_answer("one").unwrap();
        assert_eq!(s.revision, 1);
        let s = s.skip().unwrap();
        assert_eq!(s.revision, 2);
    }

    #[test]
    fn test_state_without_revision_loads_as_zero() {
        let mut value = to_json(&session(2)).unwrap();
        value.as_object_mut().unwrap().remove("revision");
        let back: PracticeSession = serde_json::from_value(value).unwrap();
        assert_eq!(back.revision, 0);
    }

    #[test]
    fn test_concurrent_answers_only_one_saves() {
        // Two requests load the same stored session and each advance it.
        let stored = session(3);
        let loaded = stored.revision;
        let first = stored.clone().record_answer("from tab one").unwrap();
        let second = stored.skip().unwrap();
        assert_eq!(first.revision, second.revision);

        // The store accepts a save only while its revision equals the loaded one.
        let mut store = (0u64, None::<PracticeSession>);
        let mut save = |expected: u64, s: &PracticeSession| {
            let rows = u64::from(store.0 == expected);
            if rows == 1 {
                store = (s.revision, Some(s.clone()));
            }
            check_saved(rows, Uuid::nil())
        };

        assert!(save(loaded, &first).is_ok());
        assert!(matches!(save(loaded, &second), Err(AppError::Conflict(_))));
        assert_eq!(store.1.unwrap().responses.len(), 1);
    }
}
