//! File system operations with rollback support.
//!
//! Deletes are staged into a backup mirror first and only become permanent
//! once every selected entry has been staged.

pub mod backup;
pub mod delete;
pub mod plan;

pub use backup::{BackupLayout, DEFAULT_BACKUP_DIR};
pub use delete::{DeleteOp, DeleteStats, Phase, execute_all};
pub use plan::{DeletePlan, TargetPlan};

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Mutating file system primitives used by the delete protocol.
///
/// Reads (metadata, directory listings) go straight to `std::fs`.
pub trait FileSystem {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn remove_dir(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

/// A directory entry as seen by the walkers.
#[derive(Debug)]
pub(crate) struct Child {
    pub path: PathBuf,
    pub name: OsString,
    pub is_dir: bool,
}

/// Lists `dir` sorted by name. Symlinks are reported as non-directories.
pub(crate) fn sorted_children(dir: &Path) -> io::Result<Vec<Child>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_dir = entry.file_type()?.is_dir();
        children.push(Child {
            path: entry.path(),
            name: entry.file_name(),
            is_dir,
        });
    }
    children.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(children)
}

pub(crate) fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

/// Returns true if something (including a dangling symlink) sits at `path`.
pub(crate) fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
