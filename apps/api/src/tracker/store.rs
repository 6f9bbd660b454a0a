use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::tracker::board::ApplicationStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    pub company: String,
    pub role: String,
    pub job_url: Option<String>,
    #[serde(default = "default_status")]
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub applied_on: Option<NaiveDate>,
}

fn default_status() -> ApplicationStatus {
    ApplicationStatus::Saved
}

impl NewApplication {
    pub fn validated(mut self) -> Result<Self, AppError> {
        self.company = self.company.trim().to_string();
        self.role = self.role.trim().to_string();
        if self.company.is_empty() || self.role.is_empty() {
            return Err(AppError::Validation(
                "company and role are required".to_string(),
            ));
        }
        self.job_url = self
            .job_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        Ok(self)
    }
}

/// Next free position at the bottom of a column.
const NEXT_POSITION: &str =
    "(SELECT COALESCE(MAX(position) + 1, 0) FROM applications WHERE user_id = $2 AND status = $3)";

pub async fn list_applications(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ApplicationRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await?,
    )
}

pub async fn get_application(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<ApplicationRow, AppError> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

pub async fn insert_application(
    pool: &PgPool,
    user_id: Uuid,
    app: &NewApplication,
) -> Result<ApplicationRow, AppError> {
    let sql = format!(
        r#"
        INSERT INTO applications (id, user_id, status, company, role, job_url, notes, applied_on, position)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, {NEXT_POSITION})
        RETURNING *
        "#
    );
    Ok(sqlx::query_as::<_, ApplicationRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(app.status.as_str())
        .bind(&app.company)
        .bind(&app.role)
        .bind(&app.job_url)
        .bind(&app.notes)
        .bind(app.applied_on)
        .fetch_one(pool)
        .await?)
}

/// Moves a card. Without an explicit position it lands at the bottom of the column.
///
/// The move rule is part of the UPDATE itself, so a card that another request
/// just moved into a terminal column is not dragged out of it.
pub async fn move_application(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    status: ApplicationStatus,
    position: Option<i32>,
) -> Result<ApplicationRow, AppError> {
    let sql = format!(
        r#"
        UPDATE applications
        SET status = $3, position = COALESCE($4, {NEXT_POSITION}), updated_at = now()
        WHERE id = $1 AND user_id = $2 AND status = ANY($5)
        RETURNING *
        "#
    );
    let moved = sqlx::query_as::<_, ApplicationRow>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(status.as_str())
        .bind(position)
        .bind(ApplicationStatus::movable_from(status))
        .fetch_optional(pool)
        .await?;

    match moved {
        Some(row) => Ok(row),
        None => {
            // Distinguish a missing card from one whose status changed underneath us.
            let current = get_application(pool, user_id, id).await?;
            Err(AppError::Conflict(format!(
                "Application {id} is now {} and cannot move to {status}; reload the board",
                current.status
            )))
        }
    }
}

pub async fn delete_application(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Application {id} not found")));
    }
    Ok(())
}
