//! Validation rules for backup directory names and target paths.
//!
//! Pure functions with no I/O or side effects.

use crate::error::{DeleteError, Result};
use std::path::{Component, Path};

const MAX_NAME_LENGTH: usize = 255;

/// Validates the backup root directory name.
///
/// ## Rules
/// - 1-255 bytes
/// - Not `.` or `..`
/// - No path separators
pub fn validate_backup_dir_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DeleteError::InvalidBackupDir(
            name.to_string(),
            "cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(DeleteError::InvalidBackupDir(
            name.to_string(),
            format!("exceeds {} bytes (has {})", MAX_NAME_LENGTH, name.len()),
        ));
    }

    if name == "." || name == ".." {
        return Err(DeleteError::InvalidBackupDir(
            name.to_string(),
            "cannot be a relative directory reference".to_string(),
        ));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(DeleteError::InvalidBackupDir(
            name.to_string(),
            "must be a plain name without path separators".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(DeleteError::InvalidBackupDir(
            name.to_string(),
            "contains a NUL byte".to_string(),
        ));
    }

    Ok(())
}

/// Validates a delete target.
///
/// Rejects filesystem roots, paths ending in `.` or `..`, and targets named
/// like the backup directory (they would be staged into themselves).
pub fn validate_target_path(path: &Path, backup_dir: &str) -> Result<()> {
    let shown = path.display().to_string();

    if path.as_os_str().is_empty() {
        return Err(DeleteError::InvalidPath(
            shown,
            "path cannot be empty".to_string(),
        ));
    }

    match path.components().next_back() {
        Some(Component::Normal(_)) => {}
        Some(Component::CurDir) | Some(Component::ParentDir) => {
            return Err(DeleteError::InvalidPath(
                shown,
                "cannot end with '.' or '..'".to_string(),
            ));
        }
        _ => {
            return Err(DeleteError::InvalidPath(
                shown,
                "cannot delete a filesystem root".to_string(),
            ));
        }
    }

    if path.file_name().is_some_and(|n| n == backup_dir) {
        return Err(DeleteError::InvalidPath(
            shown,
            format!("'{}' is the backup directory name", backup_dir),
        ));
    }

    Ok(())
}
