//! Handlers for template sharing and the approval workflow.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use replydesk_core::types::TemplateId;
use replydesk_db::models::shared_template::{ReviewRequest, ShareRequest, SubmitForApproval};

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/templates/{id}/share
///
/// Share (or re-share) a template. The acting user becomes the owner of
/// the share. Returns 201.
pub async fn share_template(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
    Json(input): Json<ShareRequest>,
) -> AppResult<impl IntoResponse> {
    let shared = state.sharing.share(id, &actor.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: shared })))
}

/// GET /api/v1/templates/{id}/share
pub async fn get_shared_template(
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
) -> AppResult<impl IntoResponse> {
    let shared = state.sharing.require(id).await?;
    Ok(Json(DataResponse { data: shared }))
}

/// POST /api/v1/templates/{id}/submit
///
/// Send a reviewed template back to `pending`.
pub async fn submit_for_approval(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
    Json(input): Json<SubmitForApproval>,
) -> AppResult<impl IntoResponse> {
    let shared = state
        .sharing
        .submit_for_approval(id, &input.reviewer_id, &actor.user_id)
        .await?;
    Ok(Json(DataResponse { data: shared }))
}

/// POST /api/v1/templates/{id}/review
///
/// Record the acting user's decision on a shared template.
pub async fn review_template(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let shared = state.sharing.review(id, &actor.user_id, input).await?;
    Ok(Json(DataResponse { data: shared }))
}

/// GET /api/v1/shared-templates
///
/// Shares the acting user owns or received.
pub async fn list_shared_for_user(
    actor: Actor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let shared = state.sharing.list_for_user(&actor.user_id).await?;
    Ok(Json(DataResponse { data: shared }))
}

/// GET /api/v1/shared-templates/pending
///
/// Review queue. Restricting it to reviewers is the gateway's job.
pub async fn list_pending(
    _actor: Actor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pending = state.sharing.list_pending().await?;
    Ok(Json(DataResponse { data: pending }))
}
