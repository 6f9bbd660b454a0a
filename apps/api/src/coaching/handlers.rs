use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::store::get_resume;
use crate::coaching::interview::{
    generate_interview_questions, resolve_count, InterviewQuestion,
};
use crate::coaching::negotiation::{generate_negotiation_plan, NegotiationInput, NegotiationPlan};
use crate::coaching::session::{
    create_session, load_session, save_session, PracticeSession, SessionProgress,
};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct InterviewRequest {
    pub user_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub job_description: String,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct InterviewResponse {
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct NegotiationRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub input: NegotiationInput,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: Uuid,
    /// Questions from an earlier `/coaching/interview` call. Generated when absent.
    pub questions: Option<Vec<InterviewQuestion>>,
    pub resume_id: Option<Uuid>,
    pub job_description: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub user_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SkipRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub current_question: Option<InterviewQuestion>,
    pub progress: SessionProgress,
    pub session: PracticeSession,
}

impl SessionResponse {
    fn new(id: Uuid, session: PracticeSession) -> Self {
        Self {
            id,
            current_question: session.current_question().cloned(),
            progress: session.progress(),
            session,
        }
    }
}

async fn questions_for(
    state: &AppState,
    user_id: Uuid,
    resume_id: Option<Uuid>,
    job_description: &str,
    count: Option<usize>,
) -> Result<Vec<InterviewQuestion>, AppError> {
    let resume_text = match resume_id {
        Some(id) => Some(get_resume(&state.db, user_id, id).await?.extracted_text),
        None => None,
    };
    generate_interview_questions(
        &state.llm,
        &state.cache,
        job_description,
        resume_text.as_deref(),
        resolve_count(count),
    )
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/coaching/interview
pub async fn handle_interview(
    State(state): State<AppState>,
    Json(req): Json<InterviewRequest>,
) -> Result<Json<InterviewResponse>, AppError> {
    let questions = questions_for(
        &state,
        req.user_id,
        req.resume_id,
        &req.job_description,
        req.count,
    )
    .await?;
    Ok(Json(InterviewResponse { questions }))
}

/// POST /api/v1/coaching/negotiation
pub async fn handle_negotiation(
    State(state): State<AppState>,
    Json(req): Json<NegotiationRequest>,
) -> Result<Json<NegotiationPlan>, AppError> {
    info!("Negotiation plan requested by user {}", req.user_id);
    let plan = generate_negotiation_plan(&state.llm, &state.cache, &req.input).await?;
    Ok(Json(plan))
}

/// POST /api/v1/coaching/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let questions = match req.questions {
        Some(questions) => questions,
        None => {
            let jd = req.job_description.as_deref().ok_or_else(|| {
                AppError::Validation(
                    "either questions or job_description is required".to_string(),
                )
            })?;
            questions_for(&state, req.user_id, req.resume_id, jd, req.count).await?
        }
    };

    let session = PracticeSession::new(questions)?;
    let id = create_session(&state.db, req.user_id, &session).await?;
    info!(
        "Created practice session {id} with {} questions",
        session.questions.len()
    );
    Ok((StatusCode::CREATED, Json(SessionResponse::new(id, session))))
}

/// GET /api/v1/coaching/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = load_session(&state.db, params.user_id, id).await?;
    Ok(Json(SessionResponse::new(id, session)))
}

/// POST /api/v1/coaching/sessions/:id/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let loaded = load_session(&state.db, req.user_id, id).await?;
    let expected = loaded.revision;
    let session = loaded.record_answer(&req.answer)?;
    save_session(&state.db, req.user_id, id, expected, &session).await?;
    Ok(Json(SessionResponse::new(id, session)))
}

/// POST /api/v1/coaching/sessions/:id/skip
pub async fn handle_skip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SkipRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let loaded = load_session(&state.db, req.user_id, id).await?;
    let expected = loaded.revision;
    let session = loaded.skip()?;
    save_session(&state.db, req.user_id, id, expected, &session).await?;
    Ok(Json(SessionResponse::new(id, session)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiation_request_flattens_input() {
        let req: NegotiationRequest = serde_json::from_str(
            r#"{
                "user_id": "00000000-0000-0000-0000-000000000000",
                "role": "SRE",
                "company": "Acme",
                "offer_amount": 150000
            }"#,
        )
        .unwrap();
        assert_eq!(req.input.role, "SRE");
        assert_eq!(req.input.offer_amount, Some(150_000.0));
        assert!(req.input.target_amount.is_none());
    }

    #[test]
    fn test_session_response_reports_current_question() {
        let session = PracticeSession::new(vec![InterviewQuestion {
            category: "behavioral".to_string(),
            question: "Why us?".to_string(),
            guidance: String::new(),
        }])
        .unwrap();
        let response = SessionResponse::new(Uuid::nil(), session);
        assert_eq!(response.current_question.unwrap().question, "Why us?");
        assert_eq!(response.progress.remaining, 1);
    }
}
