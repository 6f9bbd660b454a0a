//! Axum route handlers for contacts and the outreach engine.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::contact::{ContactRow, OutreachSequenceRow, TargetCompanyRow};
use crate::outreach::contacts::{
    delete_contact, get_contact, insert_contact, insert_sequence, insert_target, list_contacts,
    list_targets, touch_contact, NewContact, NewSequence, SOURCE_MANUAL, SOURCE_SUGGESTED,
};
use crate::outreach::dedup::{plan_import, SkippedSuggestion};
use crate::outreach::drafting::{draft_warm_intro, suggest_contacts};
use crate::outreach::ranking::{rank_contacts, ScoredCandidate, DEFAULT_RANK_LIMIT, MAX_RANK_LIMIT};
use crate::outreach::scoring::{score_referral, ReferralSignals};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub user_id: Uuid,
    pub contact: NewContact,
}

#[derive(Debug, Deserialize)]
pub struct TouchRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub user_id: Uuid,
    pub target_company: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub target_company: String,
    pub total_contacts: usize,
    pub candidates: Vec<ScoredCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTargetRequest {
    pub user_id: Uuid,
    pub company_name: String,
    pub target_role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub user_id: Uuid,
    pub target_company: String,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub imported: Vec<ContactRow>,
    pub skipped: Vec<SkippedSuggestion>,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub user_id: Uuid,
    pub contact_id: Uuid,
    pub target_company: String,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub sequence: OutreachSequenceRow,
    pub referral_likelihood: u8,
}

// ────────────────────────────────────────────────────────────────────────────
// Input checks
// ────────────────────────────────────────────────────────────────────────────

fn require_company(name: &str, field: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn resolve_limit(limit: Option<usize>) -> Result<usize, AppError> {
    match limit {
        None => Ok(DEFAULT_RANK_LIMIT),
        Some(n) if n > MAX_RANK_LIMIT => Err(AppError::Validation(format!(
            "limit must be at most {MAX_RANK_LIMIT}"
        ))),
        Some(n) => Ok(n),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Contacts
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/contacts
pub async fn handle_create_contact(
    State(state): State<AppState>,
    Json(req): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactRow>), AppError> {
    let contact = req.contact.validated()?;
    let row = insert_contact(&state.db, req.user_id, &contact, SOURCE_MANUAL).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/contacts
pub async fn handle_list_contacts(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ContactRow>>, AppError> {
    Ok(Json(list_contacts(&state.db, params.user_id).await?))
}

/// DELETE /api/v1/contacts/:id
pub async fn handle_delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    delete_contact(&state.db, params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/contacts/:id/touch
pub async fn handle_touch_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TouchRequest>,
) -> Result<Json<ContactRow>, AppError> {
    Ok(Json(touch_contact(&state.db, req.user_id, id, Utc::now()).await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Outreach
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/outreach/rank
///
/// Top-N contacts for a target company by referral likelihood.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let target_company = require_company(&req.target_company, "target_company")?;
    let limit = resolve_limit(req.limit)?;

    let contacts = list_contacts(&state.db, req.user_id).await?;
    let total_contacts = contacts.len();
    let candidates = rank_contacts(
        contacts,
        &target_company,
        limit,
        Utc::now().timestamp_millis(),
        &state.config.referral_weights,
    );

    info!(
        "Ranked {total_contacts} contacts for user {} against '{target_company}', returning {}",
        req.user_id,
        candidates.len()
    );

    Ok(Json(RankResponse {
        target_company,
        total_contacts,
        candidates,
    }))
}

/// POST /api/v1/outreach/targets
pub async fn handle_create_target(
    State(state): State<AppState>,
    Json(req): Json<CreateTargetRequest>,
) -> Result<(StatusCode, Json<TargetCompanyRow>), AppError> {
    let company = require_company(&req.company_name, "company_name")?;
    let role = req
        .target_role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    let row = insert_target(&state.db, req.user_id, &company, role).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/outreach/targets
pub async fn handle_list_targets(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<TargetCompanyRow>>, AppError> {
    Ok(Json(list_targets(&state.db, params.user_id).await?))
}

/// POST /api/v1/outreach/suggest
///
/// Asks the LLM for leads at a company and imports the ones not already known.
pub async fn handle_suggest(
    State(state): State<AppState>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    let target_company = require_company(&req.target_company, "target_company")?;

    let suggestions =
        suggest_contacts(&state.llm, &state.cache, &target_company, req.role.as_deref()).await?;
    let existing = list_contacts(&state.db, req.user_id).await?;
    let plan = plan_import(&existing, suggestions, &target_company);

    let mut imported = Vec::with_capacity(plan.to_insert.len());
    for contact in &plan.to_insert {
        imported.push(insert_contact(&state.db, req.user_id, contact, SOURCE_SUGGESTED).await?);
    }

    info!(
        "Imported {} suggested contacts for user {} ({} skipped)",
        imported.len(),
        req.user_id,
        plan.skipped.len()
    );

    Ok(Json(SuggestResponse {
        imported,
        skipped: plan.skipped,
    }))
}

/// POST /api/v1/outreach/draft
///
/// Drafts a warm-introduction email to one contact and stores it as a draft sequence.
pub async fn handle_draft(
    State(state): State<AppState>,
    Json(req): Json<DraftRequest>,
) -> Result<(StatusCode, Json<DraftResponse>), AppError> {
    let target_company = require_company(&req.target_company, "target_company")?;
    let contact = get_contact(&state.db, req.user_id, req.contact_id).await?;

    let referral_likelihood = score_referral(
        &ReferralSignals::from(&contact),
        &target_company,
        Utc::now().timestamp_millis(),
        &state.config.referral_weights,
    );

    let draft = draft_warm_intro(&state.llm, &contact, &target_company, req.role.as_deref()).await?;

    let sequence = insert_sequence(
        &state.db,
        NewSequence {
            user_id: req.user_id,
            contact_id: contact.id,
            target_company: &target_company,
            subject: &draft.subject,
            body: &draft.body,
            referral_likelihood,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DraftResponse {
            sequence,
            referral_likelihood,
        }),
    ))
}
