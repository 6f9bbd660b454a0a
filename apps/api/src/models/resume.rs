use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub s3_key: String,
    #[serde(skip_serializing)]
    pub extracted_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub job_description: String,
    pub match_score: i16,
    pub result: Value,
    /// false when the fallback analysis was stored
    pub llm_parsed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CoverLetterRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub company_name: String,
    pub tone: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
