use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::state::AppState;
use crate::tracker::board::{group_board, ApplicationStatus, BoardColumn, TrackerError};
use crate::tracker::store::{
    delete_application, get_application, insert_application, list_applications,
    move_application, NewApplication,
};

impl From<TrackerError> for AppError {
    fn from(e: TrackerError) -> Self {
        AppError::Validation(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub columns: Vec<BoardColumn>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub application: NewApplication,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub user_id: Uuid,
    pub status: ApplicationStatus,
    pub position: Option<i32>,
}

/// GET /api/v1/applications
pub async fn handle_board(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<BoardResponse>, AppError> {
    let rows = list_applications(&state.db, params.user_id).await?;
    let total = rows.len();
    Ok(Json(BoardResponse {
        columns: group_board(rows),
        total,
    }))
}

/// POST /api/v1/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let application = req.application.validated()?;
    let row = insert_application(&state.db, req.user_id, &application).await?;
    info!("Tracked application {} at {}", row.id, row.company);
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/v1/applications/:id/move
pub async fn handle_move_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    if matches!(req.position, Some(p) if p < 0) {
        return Err(AppError::Validation(
            "position cannot be negative".to_string(),
        ));
    }

    let current = get_application(&state.db, req.user_id, id).await?;
    let from: ApplicationStatus = current.status.parse()?;

    if from == req.status && req.position.is_none() {
        return Ok(Json(current));
    }
    from.check_move(req.status)?;

    let row = move_application(&state.db, req.user_id, id, req.status, req.position).await?;
    info!("Moved application {id} from {from} to {}", req.status);
    Ok(Json(row))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    delete_application(&state.db, params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
