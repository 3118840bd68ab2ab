//! Handlers for template usage statistics.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use replydesk_core::effectiveness::UsageOutcome;
use replydesk_core::types::TemplateId;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/templates/{id}/usage
///
/// Report the outcome of answering a ticket with this template.
pub async fn record_usage(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
    Json(outcome): Json<UsageOutcome>,
) -> AppResult<impl IntoResponse> {
    let stats = state
        .tracker
        .record_usage(id, outcome, Some(&actor.user_id))
        .await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/templates/{id}/stats
///
/// Zero-valued statistics when the template was never used.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
) -> AppResult<impl IntoResponse> {
    let stats = state.tracker.get_stats(id).await?;
    Ok(Json(DataResponse { data: stats }))
}
