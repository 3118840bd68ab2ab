//! Repository for the `usage_stats` collection.

use std::collections::HashMap;

use replydesk_core::effectiveness::UsageStats;
use replydesk_core::types::TemplateId;

use crate::models::usage_stats::UsageStatsRecord;
use crate::{DbPool, StoreError};

const COLLECTION: &str = "usage_stats";

/// Provides keyed access to per-template usage statistics.
pub struct UsageStatsRepo;

impl UsageStatsRepo {
    /// Stats for a template, if it has ever been used.
    pub async fn find(
        pool: &DbPool,
        template_id: TemplateId,
    ) -> Result<Option<UsageStats>, StoreError> {
        let record: Option<UsageStatsRecord> = pool.get(COLLECTION, &template_id.to_string()).await?;
        Ok(record.map(|r| r.stats))
    }

    pub async fn save(
        pool: &DbPool,
        template_id: TemplateId,
        stats: &UsageStats,
    ) -> Result<(), StoreError> {
        let record = UsageStatsRecord {
            template_id,
            stats: stats.clone(),
        };
        pool.put(COLLECTION, &template_id.to_string(), &record).await
    }

    /// Drop a template's stats. Returns whether any were stored.
    pub async fn delete(pool: &DbPool, template_id: TemplateId) -> Result<bool, StoreError> {
        pool.delete(COLLECTION, &template_id.to_string()).await
    }

    /// Every stored aggregate in one scan, keyed by template.
    pub async fn list_all(pool: &DbPool) -> Result<HashMap<TemplateId, UsageStats>, StoreError> {
        let records: Vec<UsageStatsRecord> = pool.list(COLLECTION).await?;
        Ok(records
            .into_iter()
            .map(|r| (r.template_id, r.stats))
            .collect())
    }
}
