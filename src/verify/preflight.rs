//! Pre-flight checks performed before executing a delete.
//!
//! Unlike `rules`, these functions touch the file system (resolving paths,
//! checking existence).

use crate::error::{DeleteError, Result};
use crate::verify::rules::{validate_backup_dir_name, validate_target_path};
use std::path::{Path, PathBuf};

/// Resolves `target` to an absolute path without following a final symlink.
///
/// The parent is canonicalized when it exists, so `a/../b` and `./b` compare
/// equal; the last component is kept as-is so deleting a symlink deletes
/// the link.
pub fn resolve_target(target: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(target)?;

    let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) else {
        return Ok(absolute);
    };

    match parent.canonicalize() {
        Ok(parent) => Ok(parent.join(name)),
        Err(e) => {
            log::debug!("Cannot canonicalize {}: {}", parent.display(), e);
            Ok(absolute)
        }
    }
}

/// Validates all targets and returns them resolved.
///
/// # Errors
///
/// - `InvalidBackupDir` for a bad backup directory name
/// - `InvalidPath` for a root, `.`/`..`, or backup-named target
/// - `OverlappingTargets` if a target equals or contains another one
///
/// Missing targets are allowed (deleting them is a no-op) but logged.
pub fn preflight_checks(targets: &[PathBuf], backup_dir: &str) -> Result<Vec<PathBuf>> {
    validate_backup_dir_name(backup_dir)?;

    if targets.is_empty() {
        return Err(DeleteError::InvalidPath(
            String::new(),
            "no targets given".to_string(),
        ));
    }

    let mut resolved = Vec::with_capacity(targets.len());
    for target in targets {
        validate_target_path(target, backup_dir)?;

        let path = resolve_target(target)?;
        validate_target_path(&path, backup_dir)?;

        if path.symlink_metadata().is_err() {
            log::warn!("{} does not exist, nothing to delete", target.display());
        }

        if let Some(existing) = resolved
            .iter()
            .find(|other: &&PathBuf| path.starts_with(other) || other.starts_with(&path))
        {
            return Err(DeleteError::OverlappingTargets(existing.clone(), path));
        }

        resolved.push(path);
    }

    Ok(resolved)
}
