/// Templates are keyed by time-ordered UUIDs so ids sort by creation.
pub type TemplateId = uuid::Uuid;

/// Users, reviewers and teams are identified by opaque strings owned by the
/// external identity provider.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Allocate a fresh template id.
pub fn new_template_id() -> TemplateId {
    uuid::Uuid::now_v7()
}
