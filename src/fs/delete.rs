//! All-or-nothing deletion of files and directory trees.
//!
//! ## Phases
//!
//! 1. **Prepare**: move every selected entry of the target into a backup
//!    mirror (`<parent>/.bkp/<name>`), pruning directories that end up empty
//! 2. **Commit**: permanently delete the mirror, best-effort
//! 3. **Rollback** (prepare failed): move mirrored entries back and remove
//!    the mirror
//!
//! The mirror tree is the only journal. If prepare fails, the original tree
//! is restored before the error is returned. If commit fails, the originals
//! are gone and only backup copies remain on disk.
//!
//! ## Example
//!
//! ```no_run
//! # use txn_delete::fs::{DeleteOp, execute_all};
//! # use txn_delete::filter::NameFilter;
//! # fn example() -> txn_delete::error::Result<()> {
//! DeleteOp::new("modules/old").execute()?;
//!
//! let keep = NameFilter::new([r"^README$"])?;
//! let mut ops = vec![
//!     DeleteOp::new("bundles/old").with_filter(keep.clone()),
//!     DeleteOp::new("modules/older").with_filter(keep),
//! ];
//! execute_all(&mut ops)?; // Both deleted, or neither
//! # Ok(())
//! # }
//! ```

use super::backup::{self, BackupLayout, DEFAULT_BACKUP_DIR};
use super::{FileSystem, StdFileSystem, is_empty_dir, path_exists, sorted_children};
use crate::error::{DeleteError, Result, RollbackError, RollbackReason};
use crate::filter::{AcceptAll, EntryFilter};

use std::ffi::OsString;
use std::fs;
use std::io;
use std::ops::{Add, AddAssign};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a [`DeleteOp`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing touched yet.
    Initial,
    /// Entries are being moved into the mirror.
    Preparing,
    /// Every selected entry is staged.
    Prepared,
    /// Mirror deleted; the target is gone.
    Committed,
    /// Originals are gone but backup copies remain.
    CommitFailed,
    /// Staged entries were moved back.
    RolledBack,
}

/// Counters collected while executing deletes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteStats {
    /// Files (and symlinks) moved into the mirror.
    pub files_staged: usize,
    /// Directories removed from their original location.
    pub dirs_removed: usize,
    /// Mirror entries permanently deleted on commit.
    pub backup_removed: usize,
    /// Mirror entries that could not be deleted on commit.
    pub backup_failed: usize,
}

impl Add for DeleteStats {
    type Output = DeleteStats;

    fn add(self, other: DeleteStats) -> DeleteStats {
        DeleteStats {
            files_staged: self.files_staged + other.files_staged,
            dirs_removed: self.dirs_removed + other.dirs_removed,
            backup_removed: self.backup_removed + other.backup_removed,
            backup_failed: self.backup_failed + other.backup_failed,
        }
    }
}

impl AddAssign for DeleteStats {
    fn add_assign(&mut self, other: DeleteStats) {
        *self = *self + other;
    }
}

/// A single delete target with its filter.
///
/// Used once: [`execute`](Self::execute) or [`execute_all`] drive it through
/// prepare and then commit or rollback.
#[must_use = "DeleteOp does nothing until executed"]
pub struct DeleteOp<F = StdFileSystem> {
    target: PathBuf,
    filter: Arc<dyn EntryFilter>,
    backup_dir: OsString,
    fs: F,
    phase: Phase,
    /// Whether prepare moved anything, i.e. whether the mirror is ours.
    staged: bool,
    stats: DeleteStats,
}

impl DeleteOp {
    /// Deletes `target` and everything below it.
    ///
    /// A trailing separator is dropped, so `link/` deletes the symlink
    /// `link` rather than the directory it points to.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: normalize_target(target.into()),
            filter: Arc::new(AcceptAll),
            backup_dir: OsString::from(DEFAULT_BACKUP_DIR),
            fs: StdFileSystem,
            phase: Phase::Initial,
            staged: false,
            stats: DeleteStats::default(),
        }
    }
}

fn normalize_target(target: PathBuf) -> PathBuf {
    match (target.parent(), target.file_name()) {
        (Some(parent), Some(name)) => parent.join(name),
        _ => target,
    }
}

impl<F: FileSystem> DeleteOp<F> {
    /// Only entries accepted by `filter` are deleted.
    pub fn with_filter(self, filter: impl EntryFilter + 'static) -> Self {
        self.with_shared_filter(Arc::new(filter))
    }

    /// Like [`with_filter`](Self::with_filter), sharing one filter across ops.
    pub fn with_shared_filter(mut self, filter: Arc<dyn EntryFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Overrides the backup root name (default `.bkp`).
    pub fn backup_dir_name(mut self, name: impl Into<OsString>) -> Self {
        self.backup_dir = name.into();
        self
    }

    /// Routes mutating calls through `fs`.
    pub fn with_filesystem<G: FileSystem>(self, fs: G) -> DeleteOp<G> {
        DeleteOp {
            target: self.target,
            filter: self.filter,
            backup_dir: self.backup_dir,
            fs,
            phase: self.phase,
            staged: self.staged,
            stats: self.stats,
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> DeleteStats {
        self.stats
    }

    /// Backup root and mirror location for this target.
    pub fn layout(&self) -> Result<BackupLayout> {
        BackupLayout::for_target(&self.target, &self.backup_dir)
    }

    /// Runs prepare, then commit; rolls back if prepare fails.
    ///
    /// Returns `PrepareFailed` after a rollback, or `BackupCleanupFailed` if
    /// the target is gone but its backup copy could not be fully removed.
    pub fn execute(&mut self) -> Result<DeleteStats> {
        execute_all(std::slice::from_mut(self))
    }

    /// Stage 1: moves every selected entry into the mirror.
    ///
    /// Does not roll back on failure; the caller decides (a batch rolls back
    /// every op). A missing target prepares to nothing.
    pub fn prepare(&mut self) -> Result<()> {
        if self.phase != Phase::Initial {
            return Err(DeleteError::Other(anyhow::anyhow!(
                "Delete of {} already executed",
                self.target.display()
            )));
        }

        let layout = self.layout()?;

        // Nothing to move: any mirror on disk belongs to an earlier run
        let metadata = match fs::symlink_metadata(&self.target) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("Nothing to delete at {}", self.target.display());
                self.phase = Phase::Prepared;
                return Ok(());
            }
            Err(e) => {
                return Err(DeleteError::PrepareFailed {
                    path: self.target.clone(),
                    source: e,
                });
            }
        };

        if path_exists(&layout.mirror_root) {
            return Err(DeleteError::StaleBackup(layout.mirror_root));
        }

        log::info!("Preparing delete of {}", self.target.display());
        self.phase = Phase::Preparing;
        self.staged = true;

        let target = self.target.clone();
        self.stage(&target, &layout.mirror_root, metadata.is_dir())?;

        self.phase = Phase::Prepared;
        log::debug!(
            "Staged {} files of {} into {}",
            self.stats.files_staged,
            self.target.display(),
            layout.mirror_root.display()
        );
        Ok(())
    }

    fn stage(&mut self, src: &Path, mirror: &Path, is_dir: bool) -> Result<()> {
        if !is_dir {
            if path_exists(mirror) {
                return Err(prepare_failed(
                    src,
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("backup entry already exists: {}", mirror.display()),
                    ),
                ));
            }
            if let Some(parent) = mirror.parent() {
                self.fs
                    .create_dir_all(parent)
                    .map_err(|e| prepare_failed(parent, e))?;
            }
            self.fs
                .rename(src, mirror)
                .map_err(|e| prepare_failed(src, e))?;
            self.stats.files_staged += 1;
            log::debug!("Staged {} → {}", src.display(), mirror.display());
            return Ok(());
        }

        // Mirror every directory, so empty ones can be recreated on rollback
        self.fs
            .create_dir_all(mirror)
            .map_err(|e| prepare_failed(mirror, e))?;

        for child in sorted_children(src).map_err(|e| prepare_failed(src, e))? {
            if !self.filter.accept(&child.path) {
                log::debug!("Keeping filtered entry {}", child.path.display());
                continue;
            }
            self.stage(&child.path, &mirror.join(&child.name), child.is_dir)?;
        }

        if is_empty_dir(src).map_err(|e| prepare_failed(src, e))? {
            self.fs
                .remove_dir(src)
                .map_err(|e| prepare_failed(src, e))?;
            self.stats.dirs_removed += 1;
            log::debug!("Removed emptied directory {}", src.display());
        }

        Ok(())
    }

    /// Moves everything staged so far back to its original location.
    ///
    /// No-op unless prepare was started. Failures are logged and returned
    /// for diagnostics; rollback always runs to the end.
    pub fn rollback(&mut self) -> Vec<RollbackError> {
        if !matches!(self.phase, Phase::Preparing | Phase::Prepared) {
            return Vec::new();
        }

        if !self.staged {
            self.phase = Phase::RolledBack;
            return Vec::new();
        }

        let mut failures = Vec::new();

        // prepare() only advances the phase after computing the layout
        if let Ok(layout) = self.layout() {
            log::warn!("Rolling back delete of {}", self.target.display());

            if let Ok(metadata) = fs::symlink_metadata(&layout.mirror_root) {
                let target = self.target.clone();
                self.restore(
                    &layout.mirror_root,
                    &target,
                    metadata.is_dir(),
                    &mut failures,
                );
            }
            backup::remove_if_empty(&self.fs, &layout.backup_root);
        }

        self.phase = Phase::RolledBack;

        if failures.is_empty() {
            log::info!("Rollback of {} completed", self.target.display());
        } else {
            for failure in &failures {
                log::error!("{}", failure);
            }
            log::error!(
                "Rollback of {} left {} unresolved entr{}",
                self.target.display(),
                failures.len(),
                if failures.len() == 1 { "y" } else { "ies" }
            );
        }

        failures
    }

    fn restore(
        &self,
        mirror: &Path,
        original: &Path,
        is_dir: bool,
        failures: &mut Vec<RollbackError>,
    ) {
        let fail = |path: &Path, reason: RollbackReason| RollbackError {
            path: path.to_path_buf(),
            reason,
        };

        if !is_dir {
            if path_exists(original) {
                failures.push(fail(original, RollbackReason::Collision));
                return;
            }
            if let Err(e) = self.fs.rename(mirror, original) {
                failures.push(fail(original, RollbackReason::Io(e)));
            } else {
                log::debug!("Restored {}", original.display());
            }
            return;
        }

        match fs::symlink_metadata(original) {
            Ok(m) if m.is_dir() => {}
            Ok(_) => {
                failures.push(fail(original, RollbackReason::TypeMismatch));
                return;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if let Err(e) = self.fs.create_dir_all(original) {
                    failures.push(fail(original, RollbackReason::Io(e)));
                    return;
                }
            }
            Err(e) => {
                failures.push(fail(original, RollbackReason::Io(e)));
                return;
            }
        }

        let children = match sorted_children(mirror) {
            Ok(children) => children,
            Err(e) => {
                failures.push(fail(mirror, RollbackReason::Io(e)));
                return;
            }
        };

        for child in children.into_iter().rev() {
            self.restore(&child.path, &original.join(&child.name), child.is_dir, failures);
        }

        match is_empty_dir(mirror) {
            Ok(true) => {
                if let Err(e) = self.fs.remove_dir(mirror) {
                    failures.push(fail(mirror, RollbackReason::Io(e)));
                }
            }
            Ok(false) => failures.push(fail(mirror, RollbackReason::NotEmpty)),
            Err(e) => failures.push(fail(mirror, RollbackReason::Io(e))),
        }
    }

    /// Stage 2: permanently deletes the mirror, best-effort.
    ///
    /// Every mirror entry is attempted. Returns `BackupCleanupFailed` if any
    /// remain; the original entries are gone either way.
    pub fn commit(&mut self) -> Result<()> {
        if self.phase != Phase::Prepared {
            return Err(DeleteError::Other(anyhow::anyhow!(
                "Cannot commit delete of {} in phase {:?}",
                self.target.display(),
                self.phase
            )));
        }

        if !self.staged {
            self.phase = Phase::Committed;
            return Ok(());
        }

        let layout = self.layout()?;
        let removal = backup::remove_tree(&self.fs, &layout.mirror_root);
        backup::remove_if_empty(&self.fs, &layout.backup_root);

        self.stats.backup_removed += removal.removed;
        self.stats.backup_failed += removal.failed;

        if removal.is_complete() {
            self.phase = Phase::Committed;
            log::info!("Deleted {}", self.target.display());
            Ok(())
        } else {
            self.phase = Phase::CommitFailed;
            log::warn!(
                "{} backup entr{} of {} remain in {}",
                removal.failed,
                if removal.failed == 1 { "y" } else { "ies" },
                self.target.display(),
                layout.mirror_root.display()
            );
            Err(DeleteError::BackupCleanupFailed(layout.mirror_root))
        }
    }
}

fn prepare_failed(path: &Path, source: io::Error) -> DeleteError {
    DeleteError::PrepareFailed {
        path: path.to_path_buf(),
        source,
    }
}

/// Deletes every op's target, or none of them.
///
/// Prepares all ops in order. If any prepare fails, every op is rolled back
/// and that error is returned. Only once all prepares succeeded is every op
/// committed; commit failures don't stop the others, and the first one is
/// returned after all commits ran.
pub fn execute_all<F: FileSystem>(ops: &mut [DeleteOp<F>]) -> Result<DeleteStats> {
    for idx in 0..ops.len() {
        if let Err(e) = ops[idx].prepare() {
            log::debug!(
                "Prepare of {} failed, rolling back batch",
                ops[idx].target().display()
            );
            for op in ops.iter_mut().rev() {
                op.rollback();
            }
            return Err(e);
        }
    }

    let mut first_failure = None;
    for op in ops.iter_mut() {
        if let Err(e) = op.commit() {
            log::warn!("{}", e);
            first_failure.get_or_insert(e);
        }
    }

    match first_failure {
        Some(e) => Err(e),
        None => Ok(ops
            .iter()
            .fold(DeleteStats::default(), |acc, op| acc + op.stats())),
    }
}
