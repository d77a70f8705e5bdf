//! Validation and verification for delete operations.

pub mod preflight;
pub mod prompt;
pub mod rules;

pub use preflight::{preflight_checks, resolve_target};
pub use prompt::confirm_operation;
pub use rules::{validate_backup_dir_name, validate_target_path};
