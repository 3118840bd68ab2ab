//! Route definitions for template recommendations.

use axum::routing::post;
use axum::Router;

use crate::handlers::recommendations;
use crate::state::AppState;

/// Routes mounted at `/recommendations`.
///
/// ```text
/// POST   /    recommend_templates
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(recommendations::recommend_templates))
}
