//! Route definitions for cross-template sharing views.

use axum::routing::get;
use axum::Router;

use crate::handlers::sharing;
use crate::state::AppState;

/// Routes mounted at `/shared-templates`.
///
/// ```text
/// GET    /           list_shared_for_user
/// GET    /pending    list_pending
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sharing::list_shared_for_user))
        .route("/pending", get(sharing::list_pending))
}
