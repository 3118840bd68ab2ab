//! Usage tracking for templates, shared or not.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use replydesk_core::effectiveness::{validate_outcome, UsageOutcome, UsageStats};
use replydesk_core::error::CoreError;
use replydesk_core::types::TemplateId;
use replydesk_db::repositories::{SharedTemplateRepo, TemplateRepo, UsageStatsRepo};
use replydesk_db::DbPool;
use replydesk_events::{Notifier, PlatformEvent, TemplateEvent};

use super::locks::KeyedLocks;

/// Maintains per-template usage statistics and the effectiveness block of
/// shared templates.
#[derive(Clone)]
pub struct EffectivenessTracker {
    pool: DbPool,
    locks: Arc<KeyedLocks>,
    notifier: Notifier,
}

impl EffectivenessTracker {
    pub fn new(pool: DbPool, locks: Arc<KeyedLocks>, notifier: Notifier) -> Self {
        Self {
            pool,
            locks,
            notifier,
        }
    }

    /// Fold one use of a template into its statistics.
    ///
    /// A shared template's effectiveness is updated under the same lock and
    /// announced with an `effectiveness_updated` event once the lock is
    /// released. If the shared record cannot be written the stats write is
    /// rolled back, so both aggregates always count the same uses.
    pub async fn record_usage(
        &self,
        id: TemplateId,
        outcome: UsageOutcome,
        actor_id: Option<&str>,
    ) -> Result<UsageStats, CoreError> {
        validate_outcome(&outcome)?;

        let guard = self.locks.lock(id).await;
        if TemplateRepo::find_by_id(&self.pool, id).await?.is_none() {
            return Err(CoreError::not_found("Template", id));
        }

        let now = Utc::now();
        let previous = UsageStatsRepo::find(&self.pool, id).await?;
        let mut shared = SharedTemplateRepo::find_by_template(&self.pool, id).await?;

        let mut stats = previous.clone().unwrap_or_default();
        stats.record(&outcome, now);
        UsageStatsRepo::save(&self.pool, id, &stats).await?;

        if let Some(shared) = shared.as_mut() {
            shared.effectiveness.record(&outcome, now);
            if let Err(e) = SharedTemplateRepo::save(&self.pool, shared).await {
                self.restore_stats(id, previous.as_ref()).await;
                return Err(e.into());
            }
        }
        drop(guard);

        tracing::info!(
            template_id = %id,
            usage_count = stats.usage_count,
            was_successful = outcome.was_successful,
            "Template usage recorded"
        );

        if let Some(shared) = shared {
            let mut event = PlatformEvent::new(TemplateEvent::EffectivenessUpdated {
                template_id: id,
                effectiveness: shared.effectiveness,
            });
            if let Some(actor_id) = actor_id {
                event = event.with_actor(actor_id);
            }
            self.notifier.notify(event).await;
        }

        Ok(stats)
    }

    /// Put back the stats a failed usage update replaced.
    async fn restore_stats(&self, id: TemplateId, previous: Option<&UsageStats>) {
        let restored = match previous {
            Some(stats) => UsageStatsRepo::save(&self.pool, id, stats).await,
            None => UsageStatsRepo::delete(&self.pool, id).await.map(|_| ()),
        };
        if let Err(e) = restored {
            tracing::error!(template_id = %id, error = %e, "Failed to roll back usage stats");
        }
    }

    /// Statistics for a template; all zero if it was never used.
    pub async fn get_stats(&self, id: TemplateId) -> Result<UsageStats, CoreError> {
        Ok(UsageStatsRepo::find(&self.pool, id)
            .await?
            .unwrap_or_default())
    }

    /// Every stored aggregate, keyed by template.
    pub async fn all_stats(&self) -> Result<HashMap<TemplateId, UsageStats>, CoreError> {
        Ok(UsageStatsRepo::list_all(&self.pool).await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
