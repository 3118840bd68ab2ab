//! Approval workflow for shared templates.
//!
//! ```text
//! pending --review--> approved
//! pending --review--> rejected
//! approved|rejected --submit--> pending
//! ```
//!
//! A review on an already-reviewed record overwrites the earlier decision
//! (last writer wins). Every other move fails with
//! [`CoreError::InvalidState`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// All valid status values.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

/// Approval status of a shared template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Approved => STATUS_APPROVED,
            Self::Rejected => STATUS_REJECTED,
        }
    }

    /// Whether a reviewer has reached a decision.
    pub fn is_decided(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Apply a reviewer decision.
    ///
    /// `decision` must be approved or rejected. The current status may be
    /// anything: reviewing twice overwrites the first decision.
    pub fn review(self, decision: ApprovalStatus) -> Result<ApprovalStatus, CoreError> {
        if !decision.is_decided() {
            return Err(CoreError::InvalidState(format!(
                "A review must decide '{STATUS_APPROVED}' or '{STATUS_REJECTED}', not '{}'",
                decision.as_str()
            )));
        }
        Ok(decision)
    }

    /// Re-submit a decided template for another review round.
    pub fn resubmit(self) -> Result<ApprovalStatus, CoreError> {
        if !self.is_decided() {
            return Err(CoreError::InvalidState(
                "Template is already pending approval".to_string(),
            ));
        }
        Ok(Self::Pending)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_APPROVED => Ok(Self::Approved),
            STATUS_REJECTED => Ok(Self::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid approval status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}
