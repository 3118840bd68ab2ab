//! Sharing registry and the approval state machine around it.
//!
//! A template has at most one sharing record. Records reference templates
//! by id only; a record whose template has been deleted is treated as
//! absent by every read and transition.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use replydesk_core::approval::ApprovalStatus;
use replydesk_core::error::CoreError;
use replydesk_core::template::validate_comment;
use replydesk_core::types::{TemplateId, UserId};
use replydesk_db::models::shared_template::{
    ReviewRequest, ShareRequest, SharedTemplate, SharingRecord,
};
use replydesk_db::repositories::{SharedTemplateRepo, TemplateRepo};
use replydesk_db::DbPool;
use replydesk_events::{Notifier, PlatformEvent, TemplateEvent};

use super::locks::KeyedLocks;
use super::require_actor;

const ENTITY: &str = "SharedTemplate";

/// Records who a template is shared with and where its review stands.
#[derive(Clone)]
pub struct SharingRegistry {
    pool: DbPool,
    locks: Arc<KeyedLocks>,
    notifier: Notifier,
}

impl SharingRegistry {
    pub fn new(pool: DbPool, locks: Arc<KeyedLocks>, notifier: Notifier) -> Self {
        Self {
            pool,
            locks,
            notifier,
        }
    }

    /// Share a template, or re-share it with a new audience.
    ///
    /// Either way the record starts over at `pending`. Effectiveness
    /// gathered under an earlier share is kept.
    pub async fn share(
        &self,
        id: TemplateId,
        owner_id: &str,
        input: ShareRequest,
    ) -> Result<SharedTemplate, CoreError> {
        require_actor(owner_id)?;
        let shared_with = dedup_recipients(input.shared_with)?;

        let guard = self.locks.lock(id).await;
        let template = TemplateRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Template", id))?;
        let effectiveness = SharedTemplateRepo::find_by_template(&self.pool, id)
            .await?
            .map(|r| r.effectiveness)
            .unwrap_or_default();

        let record = SharingRecord {
            template_id: id,
            shared_by: owner_id.to_string(),
            shared_with,
            team_id: input.team_id,
            approval_status: ApprovalStatus::Pending,
            approval_comment: None,
            reviewed_by: None,
            reviewed_at: None,
            shared_at: Utc::now(),
            effectiveness,
        };
        SharedTemplateRepo::save(&self.pool, &record).await?;
        drop(guard);

        tracing::info!(
            template_id = %id,
            owner_id,
            recipients = record.shared_with.len(),
            "Template shared"
        );
        self.notifier
            .notify(
                PlatformEvent::new(TemplateEvent::Shared {
                    template_id: id,
                    shared_by: record.shared_by.clone(),
                    shared_with: record.shared_with.clone(),
                    team_id: record.team_id.clone(),
                })
                .with_actor(owner_id),
            )
            .await;

        Ok(SharedTemplate {
            template,
            sharing: record,
        })
    }

    /// Send a reviewed template back to `pending` for another round.
    pub async fn submit_for_approval(
        &self,
        id: TemplateId,
        reviewer_id: &str,
        actor_id: &str,
    ) -> Result<SharedTemplate, CoreError> {
        require_actor(actor_id)?;
        require_actor(reviewer_id)?;

        let guard = self.locks.lock(id).await;
        let SharedTemplate {
            template,
            sharing: mut record,
        } = self.require(id).await?;
        record.approval_status = record.approval_status.resubmit()?;
        SharedTemplateRepo::save(&self.pool, &record).await?;
        drop(guard);

        tracing::info!(template_id = %id, reviewer_id, actor_id, "Template submitted for approval");
        self.notifier
            .notify(
                PlatformEvent::new(TemplateEvent::ApprovalRequested {
                    template_id: id,
                    reviewer_id: reviewer_id.to_string(),
                })
                .with_actor(actor_id),
            )
            .await;

        Ok(SharedTemplate {
            template,
            sharing: record,
        })
    }

    /// Record a reviewer's decision. A later review overwrites an earlier one.
    pub async fn review(
        &self,
        id: TemplateId,
        reviewer_id: &str,
        input: ReviewRequest,
    ) -> Result<SharedTemplate, CoreError> {
        require_actor(reviewer_id)?;
        if let Some(comment) = &input.comment {
            validate_comment(comment)?;
        }

        let guard = self.locks.lock(id).await;
        let SharedTemplate {
            template,
            sharing: mut record,
        } = self.require(id).await?;
        record.approval_status = record.approval_status.review(input.status)?;
        record.approval_comment = input.comment;
        record.reviewed_by = Some(reviewer_id.to_string());
        record.reviewed_at = Some(Utc::now());
        SharedTemplateRepo::save(&self.pool, &record).await?;
        drop(guard);

        tracing::info!(
            template_id = %id,
            reviewer_id,
            status = %record.approval_status,
            "Template reviewed"
        );
        self.notifier
            .notify(
                PlatformEvent::new(TemplateEvent::ReviewCompleted {
                    template_id: id,
                    reviewer_id: reviewer_id.to_string(),
                    status: record.approval_status,
                    comment: record.approval_comment.clone(),
                })
                .with_actor(reviewer_id),
            )
            .await;

        Ok(SharedTemplate {
            template,
            sharing: record,
        })
    }

    /// The shared view of one template.
    pub async fn require(&self, id: TemplateId) -> Result<SharedTemplate, CoreError> {
        let record = SharedTemplateRepo::find_by_template(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?;
        let template = TemplateRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?;
        Ok(SharedTemplate {
            template,
            sharing: record,
        })
    }

    /// Every share `user_id` owns or received.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<SharedTemplate>, CoreError> {
        self.joined(|r| r.is_visible_to(user_id)).await
    }

    /// Every share awaiting a review decision.
    pub async fn list_pending(&self) -> Result<Vec<SharedTemplate>, CoreError> {
        self.joined(|r| r.approval_status == ApprovalStatus::Pending)
            .await
    }

    /// Join matching sharing records with their templates, skipping
    /// dangling records.
    async fn joined(
        &self,
        keep: impl Fn(&SharingRecord) -> bool,
    ) -> Result<Vec<SharedTemplate>, CoreError> {
        let records = SharedTemplateRepo::list(&self.pool).await?;
        let mut templates: HashMap<TemplateId, _> = TemplateRepo::list(&self.pool)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let mut out = Vec::new();
        for record in records.into_iter().filter(|r| keep(r)) {
            match templates.remove(&record.template_id) {
                Some(template) => out.push(SharedTemplate {
                    template,
                    sharing: record,
                }),
                None => {
                    tracing::debug!(template_id = %record.template_id, "Skipping dangling share");
                }
            }
        }
        Ok(out)
    }
}

/// Drop repeated recipients, keeping first-seen order.
fn dedup_recipients(recipients: Vec<UserId>) -> Result<Vec<UserId>, CoreError> {
    let mut out: Vec<UserId> = Vec::with_capacity(recipients.len());
    for user in recipients {
        if user.trim().is_empty() {
            return Err(CoreError::Validation(
                "Recipient ids must not be empty".to_string(),
            ));
        }
        if !out.contains(&user) {
            out.push(user);
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use replydesk_core::effectiveness::UsageStats;
    use replydesk_db::models::template::CreateTemplate;
    use replydesk_db::DEFAULT_STORE_TIMEOUT;
    use replydesk_events::{EventBus, DEFAULT_PUBLISH_TIMEOUT};
    use tokio::sync::broadcast;

    use super::*;
    use crate::engine::test_support::{FailingPort, FlakyStore, HangingPort, SlowPort};
    use crate::engine::TemplateCatalog;

    struct Fixture {
        catalog: TemplateCatalog,
        sharing: SharingRegistry,
        events: broadcast::Receiver<PlatformEvent>,
    }

    fn fixture() -> Fixture {
        let pool = DbPool::in_memory();
        let locks = Arc::new(KeyedLocks::new());
        let bus = Arc::new(EventBus::default());
        let events = bus.subscribe();
        let notifier = Notifier::new(bus, DEFAULT_PUBLISH_TIMEOUT);
        Fixture {
            catalog: TemplateCatalog::new(pool.clone(), Arc::clone(&locks)),
            sharing: SharingRegistry::new(pool, locks, notifier),
            events,
        }
    }

    async fn create(catalog: &TemplateCatalog) -> TemplateId {
        catalog
            .create(
                CreateTemplate {
                    name: "Refund".into(),
                    category: "billing".into(),
                    tags: vec!["invoice".into(), "urgent".into()],
                    content: "Hi".into(),
                },
                "u1",
            )
            .await
            .unwrap()
            .id
    }

    fn share_with(users: &[&str]) -> ShareRequest {
        ShareRequest {
            shared_with: users.iter().map(|u| u.to_string()).collect(),
            team_id: None,
        }
    }

    fn decide(status: ApprovalStatus, comment: Option<&str>) -> ReviewRequest {
        ReviewRequest {
            status,
            comment: comment.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn share_then_approve() {
        let mut f = fixture();
        let id = create(&f.catalog).await;

        let shared = f.sharing.share(id, "u1", share_with(&["u2", "u3"])).await.unwrap();
        assert_eq!(shared.sharing.approval_status, ApprovalStatus::Pending);
        assert_eq!(shared.sharing.effectiveness, UsageStats::default());

        let reviewed = f
            .sharing
            .review(id, "u4", decide(ApprovalStatus::Approved, Some("ok")))
            .await
            .unwrap();
        assert_eq!(reviewed.sharing.approval_status, ApprovalStatus::Approved);
        assert_eq!(reviewed.sharing.reviewed_by.as_deref(), Some("u4"));
        assert_eq!(reviewed.sharing.approval_comment.as_deref(), Some("ok"));
        assert!(reviewed.sharing.reviewed_at.is_some());

        let first = f.events.recv().await.unwrap();
        assert_eq!(first.payload.action(), "shared");
        assert_eq!(first.actor_id.as_deref(), Some("u1"));
        let second = f.events.recv().await.unwrap();
        assert_matches!(
            second.payload,
            TemplateEvent::ReviewCompleted { status: ApprovalStatus::Approved, .. }
        );
    }

    #[tokio::test]
    async fn share_unknown_template_is_not_found() {
        let f = fixture();
        let err = f
            .sharing
            .share(uuid::Uuid::now_v7(), "u1", share_with(&["u2"]))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Template", .. });
    }

    #[tokio::test]
    async fn share_requires_owner_and_dedups_recipients() {
        let f = fixture();
        let id = create(&f.catalog).await;

        assert_matches!(
            f.sharing.share(id, "", share_with(&["u2"])).await,
            Err(CoreError::Validation(_))
        );

        let shared = f
            .sharing
            .share(id, "u1", share_with(&["u2", "u3", "u2"]))
            .await
            .unwrap();
        assert_eq!(shared.sharing.shared_with, ["u2", "u3"]);
    }

    #[tokio::test]
    async fn review_twice_is_last_writer_wins() {
        let f = fixture();
        let id = create(&f.catalog).await;
        f.sharing.share(id, "u1", share_with(&["u2"])).await.unwrap();

        let approve = || decide(ApprovalStatus::Approved, None);
        let a = f.sharing.review(id, "u4", approve()).await.unwrap();
        let b = f.sharing.review(id, "u4", approve()).await.unwrap();
        assert_eq!(a.sharing.approval_status, b.sharing.approval_status);

        let c = f
            .sharing
            .review(id, "u5", decide(ApprovalStatus::Rejected, Some("tone")))
            .await
            .unwrap();
        assert_eq!(c.sharing.approval_status, ApprovalStatus::Rejected);
        assert_eq!(c.sharing.reviewed_by.as_deref(), Some("u5"));
    }

    #[tokio::test]
    async fn review_to_pending_is_invalid_state() {
        let f = fixture();
        let id = create(&f.catalog).await;
        f.sharing.share(id, "u1", share_with(&["u2"])).await.unwrap();

        assert_matches!(
            f.sharing.review(id, "u4", decide(ApprovalStatus::Pending, None)).await,
            Err(CoreError::InvalidState(_))
        );
    }

    #[tokio::test]
    async fn review_unshared_template_is_not_found() {
        let f = fixture();
        let id = create(&f.catalog).await;
        assert_matches!(
            f.sharing.review(id, "u4", decide(ApprovalStatus::Approved, None)).await,
            Err(CoreError::NotFound { entity: "SharedTemplate", .. })
        );
    }

    #[tokio::test]
    async fn resubmit_after_decision() {
        let f = fixture();
        let id = create(&f.catalog).await;
        f.sharing.share(id, "u1", share_with(&["u2"])).await.unwrap();

        assert_matches!(
            f.sharing.submit_for_approval(id, "u4", "u1").await,
            Err(CoreError::InvalidState(_))
        );

        f.sharing
            .review(id, "u4", decide(ApprovalStatus::Rejected, None))
            .await
            .unwrap();
        let again = f.sharing.submit_for_approval(id, "u4", "u1").await.unwrap();
        assert_eq!(again.sharing.approval_status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn reshare_resets_review_and_keeps_effectiveness() {
        let f = fixture();
        let id = create(&f.catalog).await;
        f.sharing.share(id, "u1", share_with(&["u2"])).await.unwrap();

        // Simulate accumulated effectiveness on the stored record.
        let mut record = f.sharing.require(id).await.unwrap().sharing;
        record.effectiveness.usage_count = 4;
        record.approval_status = ApprovalStatus::Approved;
        SharedTemplateRepo::save(&f.sharing.pool, &record).await.unwrap();

        let reshared = f.sharing.share(id, "u1", share_with(&["u9"])).await.unwrap();
        assert_eq!(reshared.sharing.approval_status, ApprovalStatus::Pending);
        assert_eq!(reshared.sharing.shared_with, ["u9"]);
        assert_eq!(reshared.sharing.effectiveness.usage_count, 4);
    }

    #[tokio::test]
    async fn list_for_user_and_pending() {
        let f = fixture();
        let a = create(&f.catalog).await;
        let b = create(&f.catalog).await;
        f.sharing.share(a, "u1", share_with(&["u2", "u3"])).await.unwrap();
        f.sharing.share(b, "u7", share_with(&["u8"])).await.unwrap();
        f.sharing
            .review(b, "u4", decide(ApprovalStatus::Approved, None))
            .await
            .unwrap();

        let for_u1 = f.sharing.list_for_user("u1").await.unwrap();
        assert_eq!(for_u1.len(), 1);
        assert_eq!(for_u1[0].template.id, a);
        assert_eq!(f.sharing.list_for_user("u3").await.unwrap().len(), 1);
        assert!(f.sharing.list_for_user("nobody").await.unwrap().is_empty());

        let pending = f.sharing.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].template.id, a);
    }

    #[tokio::test]
    async fn dangling_records_are_not_found() {
        let f = fixture();
        let id = create(&f.catalog).await;
        f.sharing.share(id, "u1", share_with(&["u2"])).await.unwrap();
        f.catalog.delete(id, "u1").await.unwrap();

        assert!(f.sharing.list_for_user("u1").await.unwrap().is_empty());
        assert!(f.sharing.list_pending().await.unwrap().is_empty());
        assert_matches!(
            f.sharing.review(id, "u4", decide(ApprovalStatus::Approved, None)).await,
            Err(CoreError::NotFound { .. })
        );
        assert_matches!(f.sharing.require(id).await, Err(CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_share() {
        let pool = DbPool::in_memory();
        let locks = Arc::new(KeyedLocks::new());
        let catalog = TemplateCatalog::new(pool.clone(), Arc::clone(&locks));
        let notifier = Notifier::new(Arc::new(FailingPort), DEFAULT_PUBLISH_TIMEOUT);
        let sharing = SharingRegistry::new(pool, locks, notifier);

        let id = create(&catalog).await;
        let shared = sharing.share(id, "u1", share_with(&["u2"])).await.unwrap();
        assert_eq!(shared.sharing.approval_status, ApprovalStatus::Pending);
        assert!(sharing.require(id).await.is_ok());
    }

    #[tokio::test]
    async fn slow_publisher_is_abandoned() {
        let pool = DbPool::in_memory();
        let locks = Arc::new(KeyedLocks::new());
        let catalog = TemplateCatalog::new(pool.clone(), Arc::clone(&locks));
        let notifier = Notifier::new(Arc::new(HangingPort), Duration::from_millis(20));
        let sharing = SharingRegistry::new(pool, locks, notifier);

        let id = create(&catalog).await;
        let result = tokio::time::timeout(
            Duration::from_secs(2),
            sharing.share(id, "u1", share_with(&["u2"])),
        )
        .await;
        assert!(result.unwrap().is_ok());
    }

    /// Fixture over a store whose `shared_templates` writes can be made to fail.
    fn flaky_fixture() -> (Fixture, Arc<FlakyStore>) {
        let store = Arc::new(FlakyStore::failing_puts_to("shared_templates"));
        let pool = DbPool::new(store.clone(), DEFAULT_STORE_TIMEOUT);
        let locks = Arc::new(KeyedLocks::new());
        let bus = Arc::new(EventBus::default());
        let events = bus.subscribe();
        let notifier = Notifier::new(bus, DEFAULT_PUBLISH_TIMEOUT);
        let fixture = Fixture {
            catalog: TemplateCatalog::new(pool.clone(), Arc::clone(&locks)),
            sharing: SharingRegistry::new(pool, locks, notifier),
            events,
        };
        (fixture, store)
    }

    #[tokio::test]
    async fn failed_share_write_leaves_no_record_or_event() {
        let (mut f, store) = flaky_fixture();
        let id = create(&f.catalog).await;
        store.arm();

        assert_matches!(
            f.sharing.share(id, "u1", share_with(&["u2"])).await,
            Err(CoreError::Dependency(_))
        );
        assert_matches!(f.sharing.require(id).await, Err(CoreError::NotFound { .. }));
        assert!(f.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_review_write_keeps_previous_state() {
        let (mut f, store) = flaky_fixture();
        let id = create(&f.catalog).await;
        f.sharing.share(id, "u1", share_with(&["u2"])).await.unwrap();
        let _shared_event = f.events.recv().await.unwrap();
        store.arm();

        assert_matches!(
            f.sharing
                .review(id, "lead", decide(ApprovalStatus::Approved, Some("ok")))
                .await,
            Err(CoreError::Dependency(_))
        );
        let record = f.sharing.require(id).await.unwrap().sharing;
        assert_eq!(record.approval_status, ApprovalStatus::Pending);
        assert!(record.reviewed_by.is_none());
        assert!(f.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn template_is_unlocked_while_publishing() {
        let pool = DbPool::in_memory();
        let locks = Arc::new(KeyedLocks::new());
        let catalog = TemplateCatalog::new(pool.clone(), Arc::clone(&locks));
        let notifier = Notifier::new(
            Arc::new(SlowPort(Duration::from_millis(500))),
            Duration::from_secs(2),
        );
        let sharing = SharingRegistry::new(pool, locks, notifier);
        let id = create(&catalog).await;

        let sharing_task = {
            let sharing = sharing.clone();
            tokio::spawn(async move { sharing.share(id, "u1", share_with(&["u2"])).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The share is stored and its publish is still in flight.
        let edited = tokio::time::timeout(
            Duration::from_millis(200),
            catalog.update_details(id, Default::default(), "u1"),
        )
        .await;
        assert!(edited.is_ok());
        assert!(sharing_task.await.unwrap().is_ok());
    }
}
