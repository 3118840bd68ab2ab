//! Repository for the `templates` collection.

use replydesk_core::types::TemplateId;

use crate::models::template::Template;
use crate::{DbPool, StoreError};

const COLLECTION: &str = "templates";

/// Provides keyed access to templates and their embedded versions.
pub struct TemplateRepo;

impl TemplateRepo {
    pub async fn find_by_id(pool: &DbPool, id: TemplateId) -> Result<Option<Template>, StoreError> {
        pool.get(COLLECTION, &id.to_string()).await
    }

    /// Insert or replace a template record.
    pub async fn save(pool: &DbPool, template: &Template) -> Result<(), StoreError> {
        pool.put(COLLECTION, &template.id.to_string(), template).await
    }

    /// List every template, oldest first.
    pub async fn list(pool: &DbPool) -> Result<Vec<Template>, StoreError> {
        pool.list(COLLECTION).await
    }

    /// Delete a template. Returns whether it existed.
    pub async fn delete(pool: &DbPool, id: TemplateId) -> Result<bool, StoreError> {
        pool.delete(COLLECTION, &id.to_string()).await
    }
}
