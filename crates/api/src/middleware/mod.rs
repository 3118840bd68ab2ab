//! Request extractors.
//!
//! - [`actor::Actor`] -- The acting user, from the `x-actor-id` header.

pub mod actor;
