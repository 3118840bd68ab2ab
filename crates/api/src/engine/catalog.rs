//! Template catalog: CRUD over templates and their version history.

use std::sync::Arc;

use chrono::Utc;
use replydesk_core::error::CoreError;
use replydesk_core::template::{
    compute_diff, next_version_label, normalize_tags, render, tags_match_search,
    validate_category, validate_comment, validate_content, validate_name, version_label,
    Rendered, VersionDiff,
};
use replydesk_core::types::{new_template_id, TemplateId};
use replydesk_db::models::template::{
    CreateTemplate, RenderTemplate, Template, TemplateFilter, TemplateVersion,
    UpdateTemplateContent, UpdateTemplateDetails,
};
use replydesk_db::repositories::{TemplateRepo, UsageStatsRepo};
use replydesk_db::DbPool;

use super::locks::KeyedLocks;
use super::require_actor;

const ENTITY: &str = "Template";

/// Owns template records and the version history embedded in them.
#[derive(Clone)]
pub struct TemplateCatalog {
    pool: DbPool,
    locks: Arc<KeyedLocks>,
}

impl TemplateCatalog {
    pub fn new(pool: DbPool, locks: Arc<KeyedLocks>) -> Self {
        Self { pool, locks }
    }

    /// Create a template whose history holds exactly one version, `v1`.
    pub async fn create(&self, input: CreateTemplate, actor_id: &str) -> Result<Template, CoreError> {
        require_actor(actor_id)?;
        validate_name(&input.name)?;
        validate_category(&input.category)?;
        validate_content(&input.content)?;
        let tags = normalize_tags(input.tags)?;

        let now = Utc::now();
        let first = version_label(1);
        let template = Template {
            id: new_template_id(),
            name: input.name,
            category: input.category,
            tags,
            versions: vec![TemplateVersion {
                id: first.clone(),
                content: input.content,
                created_at: now,
                created_by: actor_id.to_string(),
                comment: None,
            }],
            current_version: first,
            created_by: actor_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        TemplateRepo::save(&self.pool, &template).await?;

        tracing::info!(template_id = %template.id, actor_id, "Template created");
        Ok(template)
    }

    /// Append a new content version and make it current.
    pub async fn update(
        &self,
        id: TemplateId,
        input: UpdateTemplateContent,
        actor_id: &str,
    ) -> Result<Template, CoreError> {
        require_actor(actor_id)?;
        validate_content(&input.content)?;
        if let Some(comment) = &input.comment {
            validate_comment(comment)?;
        }

        let _guard = self.locks.lock(id).await;
        let mut template = self.require(id).await?;

        let now = Utc::now();
        let label = next_version_label(template.versions.len());
        template.versions.push(TemplateVersion {
            id: label.clone(),
            content: input.content,
            created_at: now,
            created_by: actor_id.to_string(),
            comment: input.comment,
        });
        template.current_version = label;
        template.updated_at = now;
        TemplateRepo::save(&self.pool, &template).await?;

        tracing::info!(
            template_id = %id,
            version = %template.current_version,
            actor_id,
            "Template content updated"
        );
        Ok(template)
    }

    /// Repoint `current_version` at an existing version. History is untouched.
    pub async fn revert_to_version(
        &self,
        id: TemplateId,
        version_id: &str,
        actor_id: &str,
    ) -> Result<Template, CoreError> {
        require_actor(actor_id)?;

        let _guard = self.locks.lock(id).await;
        let mut template = self.require(id).await?;
        if template.find_version(version_id).is_none() {
            return Err(CoreError::not_found("TemplateVersion", version_id));
        }

        template.current_version = version_id.to_string();
        template.updated_at = Utc::now();
        TemplateRepo::save(&self.pool, &template).await?;

        tracing::info!(template_id = %id, version = version_id, actor_id, "Template reverted");
        Ok(template)
    }

    pub async fn get(&self, id: TemplateId) -> Result<Option<Template>, CoreError> {
        Ok(TemplateRepo::find_by_id(&self.pool, id).await?)
    }

    /// Like [`get`](Self::get) but absence is a `NotFound` error.
    pub async fn require(&self, id: TemplateId) -> Result<Template, CoreError> {
        self.get(id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))
    }

    /// All templates matching `filter`, in catalog order.
    pub async fn list(&self, filter: &TemplateFilter) -> Result<Vec<Template>, CoreError> {
        let templates = TemplateRepo::list(&self.pool).await?;
        Ok(templates
            .into_iter()
            .filter(|t| filter.category.as_deref().is_none_or(|c| t.category == c))
            .filter(|t| {
                filter
                    .tag_search
                    .as_deref()
                    .is_none_or(|needle| tags_match_search(&t.tags, needle))
            })
            .collect())
    }

    /// Edit name, category or tags without creating a version.
    pub async fn update_details(
        &self,
        id: TemplateId,
        input: UpdateTemplateDetails,
        actor_id: &str,
    ) -> Result<Template, CoreError> {
        require_actor(actor_id)?;
        if let Some(name) = &input.name {
            validate_name(name)?;
        }
        if let Some(category) = &input.category {
            validate_category(category)?;
        }
        let tags = input.tags.map(normalize_tags).transpose()?;

        let _guard = self.locks.lock(id).await;
        let mut template = self.require(id).await?;
        if let Some(name) = input.name {
            template.name = name;
        }
        if let Some(category) = input.category {
            template.category = category;
        }
        if let Some(tags) = tags {
            template.tags = tags;
        }
        template.updated_at = Utc::now();
        TemplateRepo::save(&self.pool, &template).await?;

        tracing::info!(template_id = %id, actor_id, "Template details updated");
        Ok(template)
    }

    /// Remove a template and its usage statistics. Sharing records that
    /// point at it are left dangling.
    pub async fn delete(&self, id: TemplateId, actor_id: &str) -> Result<(), CoreError> {
        require_actor(actor_id)?;

        let _guard = self.locks.lock(id).await;
        if !TemplateRepo::delete(&self.pool, id).await? {
            return Err(CoreError::not_found(ENTITY, id));
        }
        UsageStatsRepo::delete(&self.pool, id).await?;

        tracing::info!(template_id = %id, actor_id, "Template deleted");
        Ok(())
    }

    /// Full history in append order.
    pub async fn versions(&self, id: TemplateId) -> Result<Vec<TemplateVersion>, CoreError> {
        Ok(self.require(id).await?.versions)
    }

    /// Word-level change summary from `from` to `to`.
    pub async fn diff(
        &self,
        id: TemplateId,
        from: &str,
        to: &str,
    ) -> Result<VersionDiff, CoreError> {
        let template = self.require(id).await?;
        let old = template
            .find_version(from)
            .ok_or_else(|| CoreError::not_found("TemplateVersion", from))?;
        let new = template
            .find_version(to)
            .ok_or_else(|| CoreError::not_found("TemplateVersion", to))?;
        Ok(compute_diff(&old.content, &new.content))
    }

    /// Substitute variables into the current version.
    pub async fn render(
        &self,
        id: TemplateId,
        input: &RenderTemplate,
    ) -> Result<Rendered, CoreError> {
        let template = self.require(id).await?;
        let current = template.current().ok_or_else(|| {
            CoreError::Internal(format!(
                "Template {id} points at missing version {}",
                template.current_version
            ))
        })?;
        Ok(render(&current.content, &input.variables))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use replydesk_core::effectiveness::UsageStats;

    use super::*;

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::new(DbPool::in_memory(), Arc::new(KeyedLocks::new()))
    }

    fn billing(content: &str) -> CreateTemplate {
        CreateTemplate {
            name: "Invoice reply".into(),
            category: "billing".into(),
            tags: vec!["invoice".into(), "urgent".into()],
            content: content.into(),
        }
    }

    fn edit(content: &str) -> UpdateTemplateContent {
        UpdateTemplateContent {
            content: content.into(),
            comment: None,
        }
    }

    #[tokio::test]
    async fn create_starts_with_single_current_version() {
        let catalog = catalog();
        let t = catalog.create(billing("Hi"), "u1").await.unwrap();

        assert_eq!(t.versions.len(), 1);
        assert_eq!(t.current_version, t.versions[0].id);
        assert_eq!(t.current_version, "v1");
        assert_eq!(t.versions[0].created_by, "u1");

        let fetched = catalog.get(t.id).await.unwrap().unwrap();
        assert_eq!(fetched.current_content(), "Hi");
    }

    #[tokio::test]
    async fn create_rejects_empty_name_or_content() {
        let catalog = catalog();
        let mut input = billing("Hi");
        input.name = "  ".into();
        assert_matches!(catalog.create(input, "u1").await, Err(CoreError::Validation(_)));
        assert_matches!(
            catalog.create(billing(""), "u1").await,
            Err(CoreError::Validation(_))
        );
    }

    #[tokio::test]
    async fn create_requires_actor() {
        assert_matches!(
            catalog().create(billing("Hi"), "").await,
            Err(CoreError::Validation(_))
        );
    }

    #[tokio::test]
    async fn updates_append_versions() {
        let catalog = catalog();
        let t = catalog.create(billing("Hi"), "u1").await.unwrap();
        let t = catalog.update(t.id, edit("Hi there"), "u1").await.unwrap();

        let ids: Vec<_> = t.versions.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["v1", "v2"]);
        assert_eq!(t.current_version, "v2");

        let mut t = t;
        for n in 0..3 {
            t = catalog.update(t.id, edit(&format!("draft {n}")), "u2").await.unwrap();
        }
        assert_eq!(t.versions.len(), 5);
        assert_eq!(t.current_version, "v5");
        assert_eq!(t.current_content(), "draft 2");
    }

    #[tokio::test]
    async fn update_unknown_template_is_not_found() {
        let err = catalog()
            .update(uuid::Uuid::now_v7(), edit("x"), "u1")
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Template", .. });
    }

    #[tokio::test]
    async fn revert_repoints_without_appending() {
        let catalog = catalog();
        let t = catalog.create(billing("Hi"), "u1").await.unwrap();
        catalog.update(t.id, edit("Hi there"), "u1").await.unwrap();

        let t = catalog.revert_to_version(t.id, "v1", "u1").await.unwrap();
        assert_eq!(t.versions.len(), 2);
        assert_eq!(t.current_version, "v1");
        assert_eq!(t.current_content(), "Hi");

        let err = catalog.revert_to_version(t.id, "v9", "u1").await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "TemplateVersion", .. });
    }

    #[tokio::test]
    async fn update_after_revert_numbers_by_history_length() {
        let catalog = catalog();
        let t = catalog.create(billing("one"), "u1").await.unwrap();
        catalog.update(t.id, edit("two"), "u1").await.unwrap();
        catalog.revert_to_version(t.id, "v1", "u1").await.unwrap();

        let t = catalog.update(t.id, edit("three"), "u1").await.unwrap();
        assert_eq!(t.current_version, "v3");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_keep_every_version() {
        let catalog = catalog();
        let id = catalog.create(billing("base"), "u1").await.unwrap().id;

        let mut handles = Vec::new();
        for n in 0..20 {
            let catalog = catalog.clone();
            handles.push(tokio::spawn(async move {
                catalog.update(id, edit(&format!("edit {n}")), "u1").await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let t = catalog.require(id).await.unwrap();
        assert_eq!(t.versions.len(), 21);
        let labels: std::collections::HashSet<_> = t.versions.iter().map(|v| &v.id).collect();
        assert_eq!(labels.len(), 21);
        assert_eq!(t.current_version, "v21");
    }

    #[tokio::test]
    async fn list_filters_by_category_and_tag() {
        let catalog = catalog();
        let a = catalog.create(billing("a"), "u1").await.unwrap();
        let mut other = billing("b");
        other.category = "shipping".into();
        other.tags = vec!["Delivery".into()];
        let b = catalog.create(other, "u1").await.unwrap();

        let all = catalog.list(&TemplateFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a.id);

        let by_category = TemplateFilter {
            category: Some("billing".into()),
            tag_search: None,
        };
        let found = catalog.list(&by_category).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);

        let by_tag = TemplateFilter {
            category: None,
            tag_search: Some("deliv".into()),
        };
        let found = catalog.list(&by_tag).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, b.id);
    }

    #[tokio::test]
    async fn update_details_keeps_history() {
        let catalog = catalog();
        let t = catalog.create(billing("Hi"), "u1").await.unwrap();
        let details = UpdateTemplateDetails {
            name: Some("Renamed".into()),
            tags: Some(vec!["a".into(), "a".into(), "b".into()]),
            ..Default::default()
        };

        let t = catalog.update_details(t.id, details, "u1").await.unwrap();
        assert_eq!(t.name, "Renamed");
        assert_eq!(t.category, "billing");
        assert_eq!(t.tags, ["a", "b"]);
        assert_eq!(t.versions.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_template() {
        let catalog = catalog();
        let t = catalog.create(billing("Hi"), "u1").await.unwrap();
        catalog.delete(t.id, "u1").await.unwrap();

        assert!(catalog.get(t.id).await.unwrap().is_none());
        assert_matches!(
            catalog.delete(t.id, "u1").await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn delete_drops_usage_stats() {
        let pool = DbPool::in_memory();
        let catalog = TemplateCatalog::new(pool.clone(), Arc::new(KeyedLocks::new()));
        let t = catalog.create(billing("Hi"), "u1").await.unwrap();
        let stats = UsageStats::default();
        UsageStatsRepo::save(&pool, t.id, &stats).await.unwrap();

        catalog.delete(t.id, "u1").await.unwrap();

        assert!(UsageStatsRepo::list_all(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn diff_and_versions() {
        let catalog = catalog();
        let t = catalog.create(billing("hello world"), "u1").await.unwrap();
        catalog.update(t.id, edit("hello there world"), "u1").await.unwrap();

        assert_eq!(catalog.versions(t.id).await.unwrap().len(), 2);

        let diff = catalog.diff(t.id, "v1", "v2").await.unwrap();
        assert!(diff.changed);
        assert_eq!(diff.additions, 1);
        assert_eq!(diff.removals, 0);

        assert_matches!(
            catalog.diff(t.id, "v1", "v7").await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn render_uses_current_version() {
        let catalog = catalog();
        let t = catalog
            .create(billing("Hi {customer.name}, ref {ticket_id}"), "u1")
            .await
            .unwrap();
        let input = RenderTemplate {
            variables: HashMap::from([("customer.name".to_string(), "Ada".to_string())]),
        };

        let rendered = catalog.render(t.id, &input).await.unwrap();
        assert_eq!(rendered.content, "Hi Ada, ref {ticket_id}");
        assert_eq!(rendered.missing, ["ticket_id"]);
    }
}
