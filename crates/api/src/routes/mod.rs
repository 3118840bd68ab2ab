pub mod health;
pub mod recommendations;
pub mod shared_templates;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /templates                                   list, create
/// /templates/{id}                              get, update, patch, delete
/// /templates/{id}/versions                     version history
/// /templates/{id}/versions/{a}/diff/{b}        word diff between versions
/// /templates/{id}/revert                       repoint current version (POST)
/// /templates/{id}/render                       substitute placeholders (POST)
/// /templates/{id}/share                        get, share
/// /templates/{id}/submit                       re-submit for approval (POST)
/// /templates/{id}/review                       approve or reject (POST)
/// /templates/{id}/usage                        record a use (POST)
/// /templates/{id}/stats                        usage statistics
///
/// /shared-templates                            shares visible to the actor
/// /shared-templates/pending                    review queue
///
/// /recommendations                             rank templates for a ticket (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/templates", templates::router())
        .nest("/shared-templates", shared_templates::router())
        .nest("/recommendations", recommendations::router())
}
