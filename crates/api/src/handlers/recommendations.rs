//! Handler for ticket-driven template recommendations.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use replydesk_core::recommendation::TicketSnapshot;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/recommendations
///
/// Score the catalog against a ticket snapshot. The scan runs on its own
/// task and is cancelled if the request is dropped (client gone or request
/// timeout).
pub async fn recommend_templates(
    State(state): State<AppState>,
    Json(ticket): Json<TicketSnapshot>,
) -> AppResult<impl IntoResponse> {
    let cancel = CancellationToken::new();
    let _abandon = cancel.clone().drop_guard();

    let engine = state.recommender.clone();
    let recommendations = tokio::spawn(async move { engine.recommend(&ticket, &cancel).await })
        .await
        .map_err(|e| AppError::InternalError(format!("Recommendation task failed: {e}")))??;

    Ok(Json(DataResponse {
        data: recommendations,
    }))
}
