//! Backup root layout and best-effort removal of backup trees.
//!
//! A target `<parent>/<name>` is staged under `<parent>/<backup-dir>/<name>`.
//! Targets sharing a parent share the backup root.

use super::{FileSystem, path_exists, sorted_children};
use crate::error::{DeleteError, Result};

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default name of the backup root directory.
pub const DEFAULT_BACKUP_DIR: &str = ".bkp";

/// Where a target is staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupLayout {
    /// `<parent>/<backup-dir>`, shared by all targets in `<parent>`.
    pub backup_root: PathBuf,
    /// `<parent>/<backup-dir>/<name>`, the mirror of this target.
    pub mirror_root: PathBuf,
}

impl BackupLayout {
    /// Computes the layout for `target`.
    ///
    /// Fails for paths without a file name (`/`, `..`) and for targets that
    /// are themselves named like the backup directory.
    pub fn for_target(target: &Path, backup_dir: &OsStr) -> Result<Self> {
        let name = target.file_name().ok_or_else(|| {
            DeleteError::InvalidPath(
                target.display().to_string(),
                "path has no file name".to_string(),
            )
        })?;

        if name == backup_dir {
            return Err(DeleteError::InvalidPath(
                target.display().to_string(),
                "target is named like the backup directory".to_string(),
            ));
        }

        let parent = target.parent().ok_or_else(|| {
            DeleteError::InvalidPath(
                target.display().to_string(),
                "path has no parent directory".to_string(),
            )
        })?;

        let backup_root = parent.join(backup_dir);
        let mirror_root = backup_root.join(name);

        Ok(Self {
            backup_root,
            mirror_root,
        })
    }
}

/// Removes `dir` if it exists and is empty.
///
/// Returns `true` if the directory is gone afterwards.
pub fn remove_if_empty<F: FileSystem>(filesystem: &F, dir: &Path) -> bool {
    match fs::read_dir(dir) {
        Ok(mut entries) => {
            if entries.next().is_some() {
                log::debug!("Keeping non-empty backup root {}", dir.display());
                return false;
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => return true,
        Err(e) => {
            log::warn!("Cannot inspect {}: {}", dir.display(), e);
            return false;
        }
    }

    match filesystem.remove_dir(dir) {
        Ok(()) => {
            log::debug!("Removed empty backup root {}", dir.display());
            true
        }
        Err(e) => {
            log::warn!("Failed to remove {}: {}", dir.display(), e);
            false
        }
    }
}

/// Outcome counters of [`remove_tree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removal {
    pub removed: usize,
    pub failed: usize,
}

impl Removal {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Deletes `path` recursively, continuing past failures.
///
/// Every failed entry is logged. A directory is only removed once all of its
/// children are gone. A missing `path` counts as removed.
pub fn remove_tree<F: FileSystem>(filesystem: &F, path: &Path) -> Removal {
    let mut removal = Removal::default();
    remove_entry(filesystem, path, &mut removal);
    removal
}

fn remove_entry<F: FileSystem>(filesystem: &F, path: &Path, removal: &mut Removal) -> bool {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return true,
        Err(e) => {
            log::warn!("Cannot inspect backup entry {}: {}", path.display(), e);
            removal.failed += 1;
            return false;
        }
    };

    if !metadata.is_dir() {
        return match filesystem.remove_file(path) {
            Ok(()) => {
                removal.removed += 1;
                true
            }
            Err(e) => {
                log::warn!("Failed to delete backup file {}: {}", path.display(), e);
                removal.failed += 1;
                false
            }
        };
    }

    let children = match sorted_children(path) {
        Ok(children) => children,
        Err(e) => {
            log::warn!("Cannot list backup directory {}: {}", path.display(), e);
            removal.failed += 1;
            return false;
        }
    };

    let mut all_removed = true;
    for child in children {
        all_removed = remove_entry(filesystem, &child.path, removal) && all_removed;
    }

    if !all_removed {
        return false;
    }

    match filesystem.remove_dir(path) {
        Ok(()) => {
            removal.removed += 1;
            true
        }
        Err(e) => {
            log::warn!("Failed to delete backup directory {}: {}", path.display(), e);
            removal.failed += 1;
            false
        }
    }
}

/// Finds backup roots left behind in `dirs`.
///
/// Returns `(backup_root, mirrors)` for each directory that has a backup root,
/// where `mirrors` lists its top-level entries.
pub fn find_stale_backups(
    dirs: &[PathBuf],
    backup_dir: &OsStr,
) -> Result<Vec<(PathBuf, Vec<PathBuf>)>> {
    let mut found = Vec::new();

    for dir in dirs {
        let backup_root = dir.join(backup_dir);
        if !path_exists(&backup_root) {
            log::debug!("No backup root in {}", dir.display());
            continue;
        }

        if !fs::symlink_metadata(&backup_root)?.is_dir() {
            return Err(DeleteError::InvalidPath(
                backup_root.display().to_string(),
                "backup root is not a directory".to_string(),
            ));
        }

        let mirrors = sorted_children(&backup_root)?
            .into_iter()
            .map(|c| c.path)
            .collect();
        found.push((backup_root, mirrors));
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::StdFileSystem;
    use tempfile::TempDir;

    #[test]
    fn test_layout_for_directory_target() {
        let layout =
            BackupLayout::for_target(Path::new("/srv/app/modules"), OsStr::new(".bkp")).unwrap();

        assert_eq!(layout.backup_root, PathBuf::from("/srv/app/.bkp"));
        assert_eq!(layout.mirror_root, PathBuf::from("/srv/app/.bkp/modules"));
    }

    #[test]
    fn test_layout_for_relative_target() {
        let layout = BackupLayout::for_target(Path::new("data"), OsStr::new(".bkp")).unwrap();

        assert_eq!(layout.backup_root, PathBuf::from(".bkp"));
        assert_eq!(layout.mirror_root, PathBuf::from(".bkp/data"));
    }

    #[test]
    fn test_layout_rejects_root() {
        let result = BackupLayout::for_target(Path::new("/"), OsStr::new(".bkp"));
        assert!(matches!(result, Err(DeleteError::InvalidPath(_, _))));
    }

    #[test]
    fn test_layout_rejects_backup_named_target() {
        let result = BackupLayout::for_target(Path::new("/srv/.bkp"), OsStr::new(".bkp"));
        assert!(matches!(result, Err(DeleteError::InvalidPath(_, _))));
    }

    #[test]
    fn test_remove_if_empty() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".bkp");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("leftover"), "x").unwrap();

        assert!(!remove_if_empty(&StdFileSystem, &dir));
        assert!(dir.exists());

        fs::remove_file(dir.join("leftover")).unwrap();
        assert!(remove_if_empty(&StdFileSystem, &dir));
        assert!(!dir.exists());

        // Missing directory counts as removed
        assert!(remove_if_empty(&StdFileSystem, &dir));
    }

    #[test]
    fn test_remove_tree_counts_entries() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("tree");
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("a/b/file.txt"), "x").unwrap();
        fs::write(root.join("top.txt"), "y").unwrap();

        let removal = remove_tree(&StdFileSystem, &root);

        assert!(removal.is_complete());
        assert_eq!(removal.removed, 5);
        assert!(!root.exists());
    }

    #[test]
    fn test_remove_tree_missing_path() {
        let temp = TempDir::new().unwrap();
        let removal = remove_tree(&StdFileSystem, &temp.path().join("missing"));
        assert!(removal.is_complete());
        assert_eq!(removal.removed, 0);
    }

    #[test]
    fn test_find_stale_backups() {
        let temp = TempDir::new().unwrap();
        let clean = temp.path().join("clean");
        let dirty = temp.path().join("dirty");
        fs::create_dir(&clean).unwrap();
        fs::create_dir_all(dirty.join(".bkp/modules")).unwrap();

        let found =
            find_stale_backups(&[clean, dirty.clone()], OsStr::new(".bkp")).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, dirty.join(".bkp"));
        assert_eq!(found[0].1, vec![dirty.join(".bkp/modules")]);
    }
}
