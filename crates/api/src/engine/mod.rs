//! Template services.
//!
//! Each service is a cheaply cloneable handle constructed once at startup
//! and shared through [`AppState`](crate::state::AppState). Services that
//! mutate a template's records share one [`KeyedLocks`] so writes to the
//! same template are serialized across all of them.

pub mod catalog;
pub mod effectiveness;
pub mod locks;
pub mod recommendation;
pub mod sharing;

pub use catalog::TemplateCatalog;
pub use effectiveness::EffectivenessTracker;
pub use locks::KeyedLocks;
pub use recommendation::{Recommendation, RecommendationEngine};
pub use sharing::SharingRegistry;

use replydesk_core::error::CoreError;

/// Reject mutations that carry no acting user.
fn require_actor(actor_id: &str) -> Result<(), CoreError> {
    if actor_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "An acting user id is required".to_string(),
        ));
    }
    Ok(())
}
