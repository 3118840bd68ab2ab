//! Record structs and DTOs.
//!
//! Each submodule contains the stored record plus the `Deserialize`
//! create/update DTOs the API layer accepts for it.

pub mod event;
pub mod shared_template;
pub mod template;
pub mod usage_stats;
