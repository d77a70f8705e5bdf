//! Subcommand orchestration.

pub mod clean;
pub mod delete;

pub use clean::CleanArgs;
pub use delete::DeleteArgs;
