//! Route definitions for templates, their versions, sharing and usage.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{sharing, templates, usage};
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /                                  list_templates (?category=&tag=)
/// POST   /                                  create_template
/// GET    /{id}                              get_template
/// PUT    /{id}                              update_template
/// PATCH  /{id}                              update_template_details
/// DELETE /{id}                              delete_template
/// GET    /{id}/versions                     list_versions
/// GET    /{id}/versions/{from}/diff/{to}    diff_versions
/// POST   /{id}/revert                       revert_template
/// POST   /{id}/render                       render_template
/// GET    /{id}/share                        get_shared_template
/// POST   /{id}/share                        share_template
/// POST   /{id}/submit                       submit_for_approval
/// POST   /{id}/review                       review_template
/// POST   /{id}/usage                        record_usage
/// GET    /{id}/stats                        get_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/{id}",
            get(templates::get_template)
                .put(templates::update_template)
                .patch(templates::update_template_details)
                .delete(templates::delete_template),
        )
        .route("/{id}/versions", get(templates::list_versions))
        .route(
            "/{id}/versions/{from}/diff/{to}",
            get(templates::diff_versions),
        )
        .route("/{id}/revert", post(templates::revert_template))
        .route("/{id}/render", post(templates::render_template))
        .route(
            "/{id}/share",
            get(sharing::get_shared_template).post(sharing::share_template),
        )
        .route("/{id}/submit", post(sharing::submit_for_approval))
        .route("/{id}/review", post(sharing::review_template))
        .route("/{id}/usage", post(usage::record_usage))
        .route("/{id}/stats", get(usage::get_stats))
}
