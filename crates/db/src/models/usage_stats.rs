//! Stored usage statistics keyed by template.

use replydesk_core::effectiveness::UsageStats;
use replydesk_core::types::TemplateId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStatsRecord {
    pub template_id: TemplateId,
    #[serde(flatten)]
    pub stats: UsageStats,
}
