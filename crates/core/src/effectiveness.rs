//! Rolling usage statistics for response templates.
//!
//! The same aggregate backs both per-template [`UsageStats`] and the
//! `effectiveness` block of a shared template. Averages are maintained as
//! incremental means so a record never has to keep individual samples.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Upper bound of the satisfaction scale (inclusive).
pub const MAX_SATISFACTION_SCORE: f64 = 5.0;

/// Running aggregate of how a template has performed.
///
/// All fields start at zero; `usage_count` only ever grows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub usage_count: u64,
    pub last_used: Option<Timestamp>,
    /// Fraction of uses that resolved the ticket, in `[0, 1]`.
    pub success_rate: f64,
    /// Mean response time in seconds.
    pub avg_response_time: f64,
    /// Running satisfaction mean in `[0, 5]`; uses without a score leave it
    /// unchanged.
    pub avg_satisfaction_score: f64,
}

/// Outcome of one use of a template to answer a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageOutcome {
    pub response_time_seconds: f64,
    pub was_successful: bool,
    pub satisfaction_score: Option<f64>,
}

/// Validate a usage outcome before it is folded into any aggregate.
pub fn validate_outcome(outcome: &UsageOutcome) -> Result<(), CoreError> {
    let rt = outcome.response_time_seconds;
    if !rt.is_finite() || rt < 0.0 {
        return Err(CoreError::Validation(format!(
            "Response time must be a non-negative number of seconds (got {rt})"
        )));
    }
    if let Some(score) = outcome.satisfaction_score {
        if !(0.0..=MAX_SATISFACTION_SCORE).contains(&score) {
            return Err(CoreError::Validation(format!(
                "Satisfaction score must be between 0 and {MAX_SATISFACTION_SCORE} (got {score})"
            )));
        }
    }
    Ok(())
}

impl UsageStats {
    /// Fold one outcome into the aggregate.
    ///
    /// With `n` prior uses each mean becomes `(mean * n + sample) / (n + 1)`.
    /// A missing satisfaction score leaves that mean untouched while the
    /// count still advances.
    pub fn record(&mut self, outcome: &UsageOutcome, now: Timestamp) {
        let n = self.usage_count as f64;
        let next = n + 1.0;
        let success = if outcome.was_successful { 1.0 } else { 0.0 };

        self.success_rate = (self.success_rate * n + success) / next;
        self.avg_response_time = (self.avg_response_time * n + outcome.response_time_seconds) / next;
        if let Some(score) = outcome.satisfaction_score {
            self.avg_satisfaction_score = (self.avg_satisfaction_score * n + score) / next;
        }
        self.usage_count += 1;
        self.last_used = Some(now);
    }

    pub fn has_been_used(&self) -> bool {
        self.usage_count > 0
    }
}
