//! Repository for the `shared_templates` collection.

use replydesk_core::types::TemplateId;

use crate::models::shared_template::SharingRecord;
use crate::{DbPool, StoreError};

const COLLECTION: &str = "shared_templates";

/// Provides keyed access to sharing records (one per template).
pub struct SharedTemplateRepo;

impl SharedTemplateRepo {
    pub async fn find_by_template(
        pool: &DbPool,
        template_id: TemplateId,
    ) -> Result<Option<SharingRecord>, StoreError> {
        pool.get(COLLECTION, &template_id.to_string()).await
    }

    pub async fn save(pool: &DbPool, record: &SharingRecord) -> Result<(), StoreError> {
        pool.put(COLLECTION, &record.template_id.to_string(), record)
            .await
    }

    pub async fn list(pool: &DbPool) -> Result<Vec<SharingRecord>, StoreError> {
        pool.list(COLLECTION).await
    }
}
