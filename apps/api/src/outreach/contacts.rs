//! Contact, target-company and outreach-sequence persistence.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::contact::{ConnectionDegree, ContactRow, OutreachSequenceRow, TargetCompanyRow};
use crate::outreach::dedup::normalize_email;

pub const SOURCE_MANUAL: &str = "manual";
pub const SOURCE_SUGGESTED: &str = "suggested";

/// A contact about to be inserted, from the API or from a suggestion import.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub connection_degree: ConnectionDegree,
    pub relationship_strength: f64,
    #[serde(default)]
    pub last_contacted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewContact {
    /// Checks the fields a user can get wrong and normalizes the email.
    pub fn validated(mut self) -> Result<Self, AppError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(AppError::Validation("name cannot be empty".to_string()));
        }
        if !self.relationship_strength.is_finite() {
            return Err(AppError::Validation(
                "relationship_strength must be a number".to_string(),
            ));
        }
        self.email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(normalize_email(raw).ok_or_else(|| {
                AppError::Validation(format!("'{raw}' is not a valid email address"))
            })?),
        };
        self.company = self
            .company
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(self)
    }
}

pub async fn insert_contact(
    pool: &PgPool,
    user_id: Uuid,
    contact: &NewContact,
    source: &str,
) -> Result<ContactRow, AppError> {
    let row = sqlx::query_as::<_, ContactRow>(
        r#"
        INSERT INTO contacts
            (id, user_id, name, email, company, title, connection_degree,
             relationship_strength, last_contacted_at, notes, source)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&contact.name)
    .bind(&contact.email)
    .bind(&contact.company)
    .bind(&contact.title)
    .bind(contact.connection_degree)
    .bind(contact.relationship_strength)
    .bind(contact.last_contacted_at)
    .bind(&contact.notes)
    .bind(source)
    .fetch_one(pool)
    .await?;

    info!("Inserted {source} contact {} for user {user_id}", row.id);
    Ok(row)
}

/// All contacts for a user in creation order. Ranking relies on this order for ties.
pub async fn list_contacts(pool: &PgPool, user_id: Uuid) -> Result<Vec<ContactRow>, AppError> {
    Ok(sqlx::query_as::<_, ContactRow>(
        "SELECT * FROM contacts WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_contact(
    pool: &PgPool,
    user_id: Uuid,
    contact_id: Uuid,
) -> Result<ContactRow, AppError> {
    sqlx::query_as::<_, ContactRow>("SELECT * FROM contacts WHERE id = $1 AND user_id = $2")
        .bind(contact_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contact {contact_id} not found")))
}

pub async fn delete_contact(pool: &PgPool, user_id: Uuid, contact_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
        .bind(contact_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Contact {contact_id} not found")));
    }
    Ok(())
}

/// Records an interaction: sets `last_contacted_at` to `at`.
pub async fn touch_contact(
    pool: &PgPool,
    user_id: Uuid,
    contact_id: Uuid,
    at: DateTime<Utc>,
) -> Result<ContactRow, AppError> {
    sqlx::query_as::<_, ContactRow>(
        "UPDATE contacts SET last_contacted_at = $1 WHERE id = $2 AND user_id = $3 RETURNING *",
    )
    .bind(at)
    .bind(contact_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Contact {contact_id} not found")))
}

pub async fn insert_target(
    pool: &PgPool,
    user_id: Uuid,
    company_name: &str,
    target_role: Option<&str>,
) -> Result<TargetCompanyRow, AppError> {
    Ok(sqlx::query_as::<_, TargetCompanyRow>(
        r#"
        INSERT INTO target_companies (id, user_id, company_name, target_role)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(company_name)
    .bind(target_role)
    .fetch_one(pool)
    .await?)
}

pub async fn list_targets(pool: &PgPool, user_id: Uuid) -> Result<Vec<TargetCompanyRow>, AppError> {
    Ok(sqlx::query_as::<_, TargetCompanyRow>(
        "SELECT * FROM target_companies WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub struct NewSequence<'a> {
    pub user_id: Uuid,
    pub contact_id: Uuid,
    pub target_company: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub referral_likelihood: u8,
}

pub async fn insert_sequence(
    pool: &PgPool,
    params: NewSequence<'_>,
) -> Result<OutreachSequenceRow, AppError> {
    Ok(sqlx::query_as::<_, OutreachSequenceRow>(
        r#"
        INSERT INTO outreach_sequences
            (id, user_id, contact_id, target_company, subject, body, referral_likelihood, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'draft')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(params.user_id)
    .bind(params.contact_id)
    .bind(params.target_company)
    .bind(params.subject)
    .bind(params.body)
    .bind(i16::from(params.referral_likelihood))
    .fetch_one(pool)
    .await?)
}
