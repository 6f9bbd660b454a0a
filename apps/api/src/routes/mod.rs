pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::analysis::resume_text::MAX_RESUME_BYTES;
use crate::coaching::handlers as coaching;
use crate::outreach::handlers as outreach;
use crate::state::AppState;
use crate::tracker::handlers as tracker;

/// Room for the multipart envelope around a maximum-size PDF.
const UPLOAD_BODY_LIMIT: usize = MAX_RESUME_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resumes & analysis
        .route(
            "/api/v1/resumes",
            post(analysis::handle_upload_resume).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/v1/resumes/upload-url", post(analysis::handle_upload_url))
        .route(
            "/api/v1/resumes/register",
            post(analysis::handle_register_resume),
        )
        .route("/api/v1/analyses", post(analysis::handle_analyze))
        .route("/api/v1/analyses/:id", get(analysis::handle_get_analysis))
        .route("/api/v1/cover-letters", post(analysis::handle_cover_letter))
        // Coaching
        .route("/api/v1/coaching/interview", post(coaching::handle_interview))
        .route(
            "/api/v1/coaching/negotiation",
            post(coaching::handle_negotiation),
        )
        .route(
            "/api/v1/coaching/sessions",
            post(coaching::handle_create_session),
        )
        .route(
            "/api/v1/coaching/sessions/:id",
            get(coaching::handle_get_session),
        )
        .route(
            "/api/v1/coaching/sessions/:id/answer",
            post(coaching::handle_answer),
        )
        .route(
            "/api/v1/coaching/sessions/:id/skip",
            post(coaching::handle_skip),
        )
        // Application tracker
        .route(
            "/api/v1/applications",
            get(tracker::handle_board).post(tracker::handle_create_application),
        )
        .route(
            "/api/v1/applications/:id",
            delete(tracker::handle_delete_application),
        )
        .route(
            "/api/v1/applications/:id/move",
            patch(tracker::handle_move_application),
        )
        // Outreach
        .route(
            "/api/v1/contacts",
            get(outreach::handle_list_contacts).post(outreach::handle_create_contact),
        )
        .route(
            "/api/v1/contacts/:id",
            delete(outreach::handle_delete_contact),
        )
        .route(
            "/api/v1/contacts/:id/touch",
            post(outreach::handle_touch_contact),
        )
        .route("/api/v1/outreach/rank", post(outreach::handle_rank))
        .route(
            "/api/v1/outreach/targets",
            get(outreach::handle_list_targets).post(outreach::handle_create_target),
        )
        .route("/api/v1/outreach/suggest", post(outreach::handle_suggest))
        .route("/api/v1/outreach/draft", post(outreach::handle_draft))
        .with_state(state)
}
