//! Acting-user extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use replydesk_core::error::CoreError;
use replydesk_core::types::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the id of the user performing the request. Set by the
/// authenticating gateway in front of this service.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The user performing the request, taken from the `x-actor-id` header.
///
/// ```ignore
/// async fn my_handler(actor: Actor) -> AppResult<Json<()>> {
///     tracing::info!(actor_id = %actor.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Missing {ACTOR_HEADER} header"
                )))
            })?;

        Ok(Actor {
            user_id: user_id.to_string(),
        })
    }
}
