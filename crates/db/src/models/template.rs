//! Response template models and DTOs.
//!
//! A [`Template`] embeds its full version history so a single keyed record
//! holds everything a read-modify-write on the template touches.

use std::collections::HashMap;

use replydesk_core::types::{TemplateId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An immutable snapshot of template content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVersion {
    /// `v1`, `v2`, ... in append order.
    pub id: String,
    pub content: String,
    pub created_at: Timestamp,
    pub created_by: UserId,
    pub comment: Option<String>,
}

/// A named, categorized, versioned canned response.
///
/// `versions` is never empty and `current_version` always names one of its
/// entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub category: String,
    pub tags: Vec<String>,
    pub versions: Vec<TemplateVersion>,
    pub current_version: String,
    pub created_by: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Template {
    pub fn find_version(&self, version_id: &str) -> Option<&TemplateVersion> {
        self.versions.iter().find(|v| v.id == version_id)
    }

    /// The version `current_version` points at.
    pub fn current(&self) -> Option<&TemplateVersion> {
        self.find_version(&self.current_version)
    }

    /// Content of the current version, or empty if the record is corrupt.
    pub fn current_content(&self) -> &str {
        self.current().map_or("", |v| v.content.as_str())
    }
}

// ---------------------------------------------------------------------------
// Create / update DTOs
// ---------------------------------------------------------------------------

/// Input for creating a template with its first version.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub content: String,
}

/// Input for appending a new content version.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTemplateContent {
    pub content: String,
    pub comment: Option<String>,
}

/// Input for editing non-content fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplateDetails {
    pub name: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Input for repointing the current version.
#[derive(Debug, Clone, Deserialize)]
pub struct RevertTemplate {
    pub version_id: String,
}

/// Variables substituted into the current version's placeholders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderTemplate {
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

/// Optional listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateFilter {
    pub category: Option<String>,
    /// Case-insensitive substring matched against any tag.
    #[serde(rename = "tag")]
    pub tag_search: Option<String>,
}
