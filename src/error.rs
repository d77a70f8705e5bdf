//! Error types for txn-delete.
//!
//! All operations return `Result<T>` which aliases `Result<T, DeleteError>`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from delete operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// An entry could not be staged into the backup mirror.
    ///
    /// Everything staged so far has been moved back before this is returned.
    #[error("Delete failed for {}: {source}", .path.display())]
    PrepareFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A backup mirror from an earlier run is still on disk.
    #[error("Stale backup present at {}; remove it or run `txn-delete clean`", .0.display())]
    StaleBackup(PathBuf),

    /// Originals are gone but the backup copies could not all be removed.
    #[error("Failed to delete backup {}", .0.display())]
    BackupCleanupFailed(PathBuf),

    /// Invalid target path.
    #[error("Invalid path '{0}': {1}")]
    InvalidPath(String, String),

    /// Invalid backup directory name.
    #[error("Invalid backup directory name '{0}': {1}")]
    InvalidBackupDir(String, String),

    /// Two targets overlap (equal or nested).
    #[error("Targets overlap: {} and {}", .0.display(), .1.display())]
    OverlappingTargets(PathBuf, PathBuf),

    /// Configuration file has unexpected content.
    #[error("Config error: {0}")]
    Config(String),

    /// User declined confirmation.
    ///
    /// Not a failure; used for control flow when the user cancels.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml_edit::TomlError),

    /// Exclude pattern failed to compile.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for txn-delete operations.
pub type Result<T> = std::result::Result<T, DeleteError>;

/// A failure while moving staged entries back.
///
/// Never returned to callers: the prepare error that triggered the rollback
/// is the one reported. Logged so operators can reconcile leftover backups.
#[derive(Debug, Error)]
#[error("Rollback of {} failed: {reason}", .path.display())]
pub struct RollbackError {
    pub path: PathBuf,
    pub reason: RollbackReason,
}

/// Why a single rollback step failed.
#[derive(Debug)]
pub enum RollbackReason {
    /// Original location is already occupied.
    Collision,
    /// Original location holds a non-directory where a directory is expected.
    TypeMismatch,
    /// Backup directory still has entries after everything was moved back.
    NotEmpty,
    /// Underlying I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for RollbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollbackReason::Collision => f.write_str("destination already exists"),
            RollbackReason::TypeMismatch => f.write_str("destination is not a directory"),
            RollbackReason::NotEmpty => f.write_str("backup directory is not empty"),
            RollbackReason::Io(e) => write!(f, "{}", e),
        }
    }
}
