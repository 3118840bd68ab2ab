//! Domain logic for the response-template subsystem.
//!
//! Everything here is free of I/O so the persistence layer, the HTTP
//! surface, and tests can share one definition of the rules:
//!
//! - [`template`] -- validation limits, placeholder rendering, version diffs.
//! - [`approval`] -- the pending/approved/rejected state machine.
//! - [`effectiveness`] -- the incremental usage-statistics update rule.
//! - [`recommendation`] -- ticket context, scoring, ranking, reason text.

pub mod approval;
pub mod effectiveness;
pub mod error;
pub mod recommendation;
pub mod template;
pub mod types;
