//! Handlers for template CRUD and version history.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use replydesk_core::types::TemplateId;
use replydesk_db::models::template::{
    CreateTemplate, RenderTemplate, RevertTemplate, TemplateFilter, UpdateTemplateContent,
    UpdateTemplateDetails,
};

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/templates
///
/// Create a template with its first version. Returns 201.
pub async fn create_template(
    actor: Actor,
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    let template = state.catalog.create(input, &actor.user_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// GET /api/v1/templates?category=&tag=
pub async fn list_templates(
    State(state): State<AppState>,
    Query(filter): Query<TemplateFilter>,
) -> AppResult<impl IntoResponse> {
    let templates = state.catalog.list(&filter).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// GET /api/v1/templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
) -> AppResult<impl IntoResponse> {
    let template = state.catalog.require(id).await?;
    Ok(Json(DataResponse { data: template }))
}

/// PUT /api/v1/templates/{id}
///
/// Append a new content version and make it current.
pub async fn update_template(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
    Json(input): Json<UpdateTemplateContent>,
) -> AppResult<impl IntoResponse> {
    let template = state.catalog.update(id, input, &actor.user_id).await?;
    Ok(Json(DataResponse { data: template }))
}

/// PATCH /api/v1/templates/{id}
///
/// Edit name, category or tags. Does not create a version.
pub async fn update_template_details(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
    Json(input): Json<UpdateTemplateDetails>,
) -> AppResult<impl IntoResponse> {
    let template = state
        .catalog
        .update_details(id, input, &actor.user_id)
        .await?;
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/v1/templates/{id}
///
/// Returns 204 No Content.
pub async fn delete_template(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
) -> AppResult<StatusCode> {
    state.catalog.delete(id, &actor.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/templates/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
) -> AppResult<impl IntoResponse> {
    let versions = state.catalog.versions(id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// POST /api/v1/templates/{id}/revert
///
/// Repoint the current version without appending to history.
pub async fn revert_template(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
    Json(input): Json<RevertTemplate>,
) -> AppResult<impl IntoResponse> {
    let template = state
        .catalog
        .revert_to_version(id, &input.version_id, &actor.user_id)
        .await?;
    Ok(Json(DataResponse { data: template }))
}

/// GET /api/v1/templates/{id}/versions/{from}/diff/{to}
pub async fn diff_versions(
    State(state): State<AppState>,
    Path((id, from, to)): Path<(TemplateId, String, String)>,
) -> AppResult<impl IntoResponse> {
    let diff = state.catalog.diff(id, &from, &to).await?;
    Ok(Json(DataResponse { data: diff }))
}

/// POST /api/v1/templates/{id}/render
pub async fn render_template(
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
    Json(input): Json<RenderTemplate>,
) -> AppResult<impl IntoResponse> {
    let rendered = state.catalog.render(id, &input).await?;
    Ok(Json(DataResponse { data: rendered }))
}
