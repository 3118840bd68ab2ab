pub mod recommendations;
pub mod sharing;
pub mod templates;
pub mod usage;
