//! Resume, analysis and cover-letter persistence.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::analyzer::AnalysisOutcome;
use crate::errors::AppError;
use crate::models::resume::{AnalysisRow, CoverLetterRow, ResumeRow};

pub async fn insert_resume(
    pool: &PgPool,
    user_id: Uuid,
    file_name: &str,
    s3_key: &str,
    extracted_text: &str,
) -> Result<ResumeRow, AppError> {
    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (id, user_id, file_name, s3_key, extracted_text)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(file_name)
    .bind(s3_key)
    .bind(extracted_text)
    .fetch_one(pool)
    .await?;

    info!("Stored resume {} for user {user_id}", row.id);
    Ok(row)
}

pub async fn get_resume(pool: &PgPool, user_id: Uuid, resume_id: Uuid) -> Result<ResumeRow, AppError> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))
}

pub async fn insert_analysis(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
    job_description: &str,
    outcome: &AnalysisOutcome,
) -> Result<AnalysisRow, AppError> {
    let result = serde_json::to_value(&outcome.analysis)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize analysis: {e}")))?;

    Ok(sqlx::query_as::<_, AnalysisRow>(
        r#"
        INSERT INTO analyses (id, user_id, resume_id, job_description, match_score, result, llm_parsed)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(resume_id)
    .bind(job_description)
    .bind(i16::from(outcome.analysis.match_score))
    .bind(&result)
    .bind(outcome.llm_parsed)
    .fetch_one(pool)
    .await?)
}

pub async fn get_analysis(
    pool: &PgPool,
    user_id: Uuid,
    analysis_id: Uuid,
) -> Result<AnalysisRow, AppError> {
    sqlx::query_as::<_, AnalysisRow>("SELECT * FROM analyses WHERE id = $1 AND user_id = $2")
        .bind(analysis_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {analysis_id} not found")))
}

pub struct NewCoverLetter<'a> {
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub company_name: &'a str,
    pub tone: &'a str,
    pub body: &'a str,
}

pub async fn insert_cover_letter(
    pool: &PgPool,
    letter: NewCoverLetter<'_>,
) -> Result<CoverLetterRow, AppError> {
    Ok(sqlx::query_as::<_, CoverLetterRow>(
        r#"
        INSERT INTO cover_letters (id, user_id, resume_id, company_name, tone, body)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(letter.user_id)
    .bind(letter.resume_id)
    .bind(letter.company_name)
    .bind(letter.tone)
    .bind(letter.body)
    .fetch_one(pool)
    .await?)
}
