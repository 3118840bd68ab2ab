//! Template recommendation scoring.
//!
//! A template's score is the sum of three independent weighted signals,
//! capped at 1.0 (never renormalized):
//!
//! | Signal          | Weight | Contribution                                   |
//! |-----------------|--------|------------------------------------------------|
//! | category match  | 0.4    | full iff template category == ticket category  |
//! | tag relevance   | 0.3    | share of tags found in the ticket's words      |
//! | usage bonus     | 0.3    | full iff the template has been used at all     |
//!
//! Only templates scoring strictly above [`MIN_SCORE`] survive, ranked
//! best-first and capped at [`MAX_RECOMMENDATIONS`].

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Weights and limits
// ---------------------------------------------------------------------------

pub const WEIGHT_CATEGORY: f64 = 0.4;
pub const WEIGHT_TAGS: f64 = 0.3;
pub const WEIGHT_USAGE: f64 = 0.3;

/// Scores must exceed this to be recommended.
pub const MIN_SCORE: f64 = 0.3;

/// Hard cap on the number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// A template used more than this many times counts as "frequently used".
pub const FREQUENT_USE_THRESHOLD: u64 = 10;

// ---------------------------------------------------------------------------
// Ticket context
// ---------------------------------------------------------------------------

/// The ticket fields the recommender reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSnapshot {
    pub id: String,
    pub category: String,
    pub priority: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Bucket a local clock hour (0-23).
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            Self::Morning
        } else if hour < 17 {
            Self::Afternoon
        } else {
            Self::Evening
        }
    }
}

/// Derived attributes a ticket is scored against.
///
/// `time_of_day` is informational only; it carries no scoring weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketContext {
    pub category: String,
    pub priority: String,
    pub time_of_day: TimeOfDay,
}

impl TicketContext {
    pub fn from_ticket(ticket: &TicketSnapshot, local_hour: u32) -> Self {
        Self {
            category: ticket.category.clone(),
            priority: ticket.priority.clone(),
            time_of_day: TimeOfDay::from_hour(local_hour),
        }
    }
}

/// Lower-cased whitespace-separated words of the ticket title and description.
pub fn ticket_words(ticket: &TicketSnapshot) -> HashSet<String> {
    ticket
        .title
        .split_whitespace()
        .chain(ticket.description.split_whitespace())
        .map(str::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// The template attributes the scorer needs.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub category: &'a str,
    pub tags: &'a [String],
    pub usage_count: u64,
}

/// A template's score plus the facts that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub value: f64,
    pub category_matched: bool,
    pub relevant_tags: usize,
}

/// Score one candidate against a ticket.
pub fn score(candidate: &Candidate<'_>, ctx: &TicketContext, words: &HashSet<String>) -> Score {
    let category_matched = candidate.category == ctx.category;
    let relevant_tags = candidate
        .tags
        .iter()
        .filter(|t| words.contains(&t.to_lowercase()))
        .count();

    let mut value = 0.0;
    if category_matched {
        value += WEIGHT_CATEGORY;
    }
    if !candidate.tags.is_empty() {
        value += WEIGHT_TAGS * (relevant_tags as f64 / candidate.tags.len() as f64);
    }
    if candidate.usage_count > 0 {
        value += WEIGHT_USAGE;
    }

    Score {
        value: value.min(1.0),
        category_matched,
        relevant_tags,
    }
}

/// Whether a score clears the recommendation threshold.
pub fn is_recommendable(score: f64) -> bool {
    score > MIN_SCORE
}

/// Keep scores above the threshold, best first, at most
/// [`MAX_RECOMMENDATIONS`]. Ties keep their input order.
pub fn rank<T>(scored: Vec<(T, f64)>) -> Vec<(T, f64)> {
    let mut kept: Vec<(T, f64)> = scored
        .into_iter()
        .filter(|(_, s)| is_recommendable(*s))
        .collect();
    // `sort_by` is stable.
    kept.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    kept.truncate(MAX_RECOMMENDATIONS);
    kept
}

// ---------------------------------------------------------------------------
// Reason text
// ---------------------------------------------------------------------------

pub const REASON_CATEGORY: &str = "matches ticket category";
pub const REASON_FREQUENT: &str = "frequently used with success";
pub const REASON_PRIORITY: &str = "appropriate for ticket priority";

/// Score as a whole percentage.
pub fn score_percent(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

/// Human-readable justification for a recommendation.
pub fn reason(candidate: &Candidate<'_>, ctx: &TicketContext, score: &Score) -> String {
    let mut clauses = Vec::new();
    if score.category_matched {
        clauses.push(REASON_CATEGORY);
    }
    if candidate.usage_count > FREQUENT_USE_THRESHOLD {
        clauses.push(REASON_FREQUENT);
    }
    if candidate.tags.iter().any(|t| *t == ctx.priority) {
        clauses.push(REASON_PRIORITY);
    }

    let pct = score_percent(score.value);
    if clauses.is_empty() {
        format!("Potential match based on content ({pct}% match)")
    } else {
        format!("This template {} ({pct}% match)", clauses.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
