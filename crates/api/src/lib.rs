//! Replydesk API server library.
//!
//! Exposes the template services, configuration, state, error handling and
//! routes so integration tests and the binary entrypoint can both access
//! them.

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
