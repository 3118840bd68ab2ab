//! Sharing and approval records for templates.

use replydesk_core::approval::ApprovalStatus;
use replydesk_core::effectiveness::UsageStats;
use replydesk_core::types::{TemplateId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use crate::models::template::Template;

/// Sharing/approval metadata for one template.
///
/// References its template by id only; the template may be deleted
/// independently, leaving this record dangling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharingRecord {
    pub template_id: TemplateId,
    pub shared_by: UserId,
    pub shared_with: Vec<UserId>,
    pub team_id: Option<String>,
    pub approval_status: ApprovalStatus,
    pub approval_comment: Option<String>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<Timestamp>,
    pub shared_at: Timestamp,
    pub effectiveness: UsageStats,
}

impl SharingRecord {
    /// Whether `user_id` owns or received this share.
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.shared_by == user_id || self.shared_with.iter().any(|u| u == user_id)
    }
}

/// A template joined with its sharing record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedTemplate {
    #[serde(flatten)]
    pub template: Template,
    #[serde(flatten)]
    pub sharing: SharingRecord,
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Request body for sharing a template.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareRequest {
    pub shared_with: Vec<UserId>,
    pub team_id: Option<String>,
}

/// Request body for sending a shared template back for review.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitForApproval {
    pub reviewer_id: UserId,
}

/// Request body for reviewing a shared template.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub status: ApprovalStatus,
    pub comment: Option<String>,
}
