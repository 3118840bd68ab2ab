//! Response template validation, version labels, placeholder rendering,
//! and version diffs.
//!
//! Used by the catalog service before anything is persisted, so every
//! stored template already satisfies these limits.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length for a template name in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length for template content in characters.
pub const MAX_CONTENT_LENGTH: usize = 20_000;

/// Maximum length for a version comment in characters.
pub const MAX_COMMENT_LENGTH: usize = 1_000;

/// Maximum number of tags on a template.
pub const MAX_TAGS_COUNT: usize = 20;

/// Maximum length of a single tag.
pub const MAX_TAG_LENGTH: usize = 50;

/// Prefix of every version identifier (`v1`, `v2`, ...).
pub const VERSION_PREFIX: char = 'v';

/// Regex pattern matching `{placeholder}` tokens in template content.
pub const PLACEHOLDER_PATTERN: &str = r"\{([a-zA-Z_][a-zA-Z0-9_.]*)\}";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a template name: non-empty after trimming and within length limit.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Template name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Template name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate template content: non-empty after trimming and within length limit.
pub fn validate_content(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Template content must not be empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Template content exceeds maximum length of {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a version comment: length check only.
pub fn validate_comment(comment: &str) -> Result<(), CoreError> {
    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Version comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a category tag. Categories are free-form but must not be blank.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if category.trim().is_empty() {
        return Err(CoreError::Validation(
            "Template category must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validate and de-duplicate a tag list.
///
/// Tags are compared verbatim; the first occurrence wins and relative order
/// is kept.
pub fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, CoreError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(tags.len());
    for tag in tags {
        if tag.trim().is_empty() {
            return Err(CoreError::Validation("Tags must not be empty".to_string()));
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(CoreError::Validation(format!(
                "Tag '{tag}' exceeds maximum length of {MAX_TAG_LENGTH} characters"
            )));
        }
        if seen.insert(tag.clone()) {
            out.push(tag);
        }
    }
    if out.len() > MAX_TAGS_COUNT {
        return Err(CoreError::Validation(format!(
            "Tag count exceeds maximum of {MAX_TAGS_COUNT} (got {})",
            out.len()
        )));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Version labels
// ---------------------------------------------------------------------------

/// Label for the `n`th version of a template (1-based).
pub fn version_label(n: usize) -> String {
    format!("{VERSION_PREFIX}{n}")
}

/// Label the version appended after `existing` versions.
pub fn next_version_label(existing: usize) -> String {
    version_label(existing + 1)
}

// ---------------------------------------------------------------------------
// Listing filter
// ---------------------------------------------------------------------------

/// Case-insensitive substring match of `needle` against any tag.
pub fn tags_match_search(tags: &[String], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

/// Extract all `{placeholder}` names from template content.
///
/// Returns a de-duplicated, sorted list (without braces).
pub fn extract_placeholders(content: &str) -> Vec<String> {
    let mut names: Vec<String> = PLACEHOLDER_RE
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Result of substituting variables into template content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendered {
    pub content: String,
    /// Placeholders with no matching variable, left verbatim in `content`.
    pub missing: Vec<String>,
}

/// Substitute `{placeholder}` tokens with values from `vars`.
pub fn render(content: &str, vars: &HashMap<String, String>) -> Rendered {
    let mut missing = Vec::new();
    let rendered = PLACEHOLDER_RE.replace_all(content, |caps: &Captures| {
        let name = &caps[1];
        match vars.get(name) {
            Some(value) => value.clone(),
            None => {
                missing.push(name.to_string());
                caps[0].to_string()
            }
        }
    });
    let content = rendered.into_owned();
    missing.sort();
    missing.dedup();
    Rendered { content, missing }
}

// ---------------------------------------------------------------------------
// Diff computation
// ---------------------------------------------------------------------------

/// Summary of differences between two template versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionDiff {
    pub changed: bool,
    /// Words present in the newer content but not the older one.
    pub additions: usize,
    /// Words present in the older content but not the newer one.
    pub removals: usize,
}

/// Compute a word-level diff summary between two contents.
///
/// Uses set-difference on word bags, so reordering alone is not counted.
pub fn compute_diff(old: &str, new: &str) -> VersionDiff {
    if old == new {
        return VersionDiff {
            changed: false,
            additions: 0,
            removals: 0,
        };
    }

    let old_words: Vec<&str> = old.split_whitespace().collect();
    let new_words: Vec<&str> = new.split_whitespace().collect();
    let old_set: HashSet<&str> = old_words.iter().copied().collect();
    let new_set: HashSet<&str> = new_words.iter().copied().collect();

    VersionDiff {
        changed: true,
        additions: new_words.iter().filter(|w| !old_set.contains(**w)).count(),
        removals: old_words.iter().filter(|w| !new_set.contains(**w)).count(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
