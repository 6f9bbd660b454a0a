use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A card on the application tracker board.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: String,
    pub role: String,
    pub job_url: Option<String>,
    /// One of the `ApplicationStatus` snake_case names.
    pub status: String,
    pub position: i32,
    pub notes: Option<String>,
    pub applied_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
