//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&DbPool` as the first argument and own one collection.

pub mod event_repo;
pub mod shared_template_repo;
pub mod template_repo;
pub mod usage_stats_repo;

pub use event_repo::EventRepo;
pub use shared_template_repo::SharedTemplateRepo;
pub use template_repo::TemplateRepo;
pub use usage_stats_repo::UsageStatsRepo;
