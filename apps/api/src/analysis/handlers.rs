//! Axum route handlers for resume upload, analysis and cover letters.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::analyzer::{run_analysis, ResumeAnalysis};
use crate::analysis::cover_letter::{generate_cover_letter, CoverLetterTone};
use crate::analysis::resume_text::{extract_resume_text, MAX_RESUME_BYTES};
use crate::analysis::store::{
    get_analysis, get_resume, insert_analysis, insert_cover_letter, insert_resume, NewCoverLetter,
};
use crate::errors::AppError;
use crate::models::resume::{AnalysisRow, CoverLetterRow, ResumeRow};
use crate::state::AppState;
use crate::storage::{
    fetch_resume_pdf, key_belongs_to, presign_resume_upload, put_resume_pdf, resume_key,
    UploadTarget,
};

const DEFAULT_FILE_NAME: &str = "resume.pdf";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UploadUrlRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResumeRequest {
    pub user_id: Uuid,
    pub s3_key: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub analysis: ResumeAnalysis,
    pub llm_parsed: bool,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub job_description: String,
    pub company_name: String,
    #[serde(default)]
    pub tone: CoverLetterTone,
}

/// Fields collected from a multipart resume upload.
#[derive(Debug, Default)]
struct UploadForm {
    user_id: Option<Uuid>,
    file_name: Option<String>,
    file: Option<Bytes>,
}

fn clean_file_name(name: Option<&str>) -> String {
    name.map(|n| n.rsplit(['/', '\\']).next().unwrap_or(n).trim())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string()
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_id" => {
                let raw = field.text().await?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?;
                form.user_id = Some(id);
            }
            "file" => {
                form.file_name = Some(clean_file_name(field.file_name()));
                form.file = Some(field.bytes().await?);
            }
            _ => {}
        }
    }
    Ok(form)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes
///
/// Multipart upload (`user_id`, `file`). Stores the PDF and its extracted text.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let form = read_upload_form(multipart).await?;
    let user_id = form
        .user_id
        .ok_or_else(|| AppError::Validation("user_id field is required".to_string()))?;
    let file = form
        .file
        .ok_or_else(|| AppError::Validation("file field is required".to_string()))?;
    let file_name = form.file_name.unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    let text = extract_resume_text(file.clone()).await?;

    let key = resume_key(user_id, Uuid::new_v4());
    put_resume_pdf(&state.s3, &state.config.s3_bucket, &key, file).await?;

    let row = insert_resume(&state.db, user_id, &file_name, &key, &text).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/v1/resumes/upload-url
///
/// Presigned PUT URL for direct-to-storage uploads; follow with `/resumes/register`.
pub async fn handle_upload_url(
    State(state): State<AppState>,
    Json(req): Json<UploadUrlRequest>,
) -> Result<Json<UploadTarget>, AppError> {
    let target = presign_resume_upload(
        &state.s3,
        &state.config.s3_bucket,
        req.user_id,
        state.config.upload_url_ttl_secs,
    )
    .await?;
    Ok(Json(target))
}

/// POST /api/v1/resumes/register
///
/// Records a resume that the client uploaded through a presigned URL.
pub async fn handle_register_resume(
    State(state): State<AppState>,
    Json(req): Json<RegisterResumeRequest>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    if !key_belongs_to(&req.s3_key, req.user_id) {
        return Err(AppError::Validation(
            "s3_key does not belong to this user".to_string(),
        ));
    }

    let pdf = fetch_resume_pdf(
        &state.s3,
        &state.config.s3_bucket,
        &req.s3_key,
        MAX_RESUME_BYTES,
    )
    .await?;
    let text = extract_resume_text(pdf).await?;
    let file_name = clean_file_name(req.file_name.as_deref());

    let row = insert_resume(&state.db, req.user_id, &file_name, &req.s3_key, &text).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/v1/analyses
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    let resume = get_resume(&state.db, req.user_id, req.resume_id).await?;

    let outcome = run_analysis(
        state.analyzer.as_ref(),
        &resume.extracted_text,
        &req.job_description,
    )
    .await?;

    let row = insert_analysis(
        &state.db,
        req.user_id,
        resume.id,
        req.job_description.trim(),
        &outcome,
    )
    .await?;

    info!(
        "Analysis {} for resume {}: match {}/100 (parsed: {})",
        row.id, resume.id, outcome.analysis.match_score, outcome.llm_parsed
    );

    Ok((
        StatusCode::CREATED,
        Json(AnalyzeResponse {
            analysis_id: row.id,
            analysis: outcome.analysis,
            llm_parsed: outcome.llm_parsed,
        }),
    ))
}

/// GET /api/v1/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<AnalysisRow>, AppError> {
    Ok(Json(get_analysis(&state.db, params.user_id, id).await?))
}

/// POST /api/v1/cover-letters
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(req): Json<CoverLetterRequest>,
) -> Result<(StatusCode, Json<CoverLetterRow>), AppError> {
    let company_name = req.company_name.trim();
    if company_name.is_empty() {
        return Err(AppError::Validation("company_name cannot be empty".to_string()));
    }
    if req.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let resume = get_resume(&state.db, req.user_id, req.resume_id).await?;
    let body = generate_cover_letter(
        &state.llm,
        &resume.extracted_text,
        &req.job_description,
        company_name,
        req.tone,
    )
    .await?;

    let row = insert_cover_letter(
        &state.db,
        NewCoverLetter {
            user_id: req.user_id,
            resume_id: resume.id,
            company_name,
            tone: req.tone.as_str(),
            body: &body,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}
