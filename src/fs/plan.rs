//! Read-only preview of what a delete would remove.

use crate::error::{DeleteError, Result};
use crate::filter::EntryFilter;

use colored::Colorize;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// What deleting a single target would do.
#[derive(Debug, Clone, Default)]
pub struct TargetPlan {
    pub target: PathBuf,
    pub exists: bool,
    /// Non-directory entries that would be removed.
    pub files: Vec<PathBuf>,
    /// Directories that would be removed (no filtered entry below them).
    pub directories: Vec<PathBuf>,
    /// Entries rejected by the filter; directories count once.
    pub skipped: Vec<PathBuf>,
}

impl TargetPlan {
    fn build(target: &Path, filter: &Arc<dyn EntryFilter>) -> Result<Self> {
        let mut plan = TargetPlan {
            target: target.to_path_buf(),
            ..Default::default()
        };

        let Ok(metadata) = target.symlink_metadata() else {
            return Ok(plan);
        };
        plan.exists = true;

        // Symlinks are removed as links, never walked
        if !metadata.is_dir() {
            plan.files.push(target.to_path_buf());
            return Ok(plan);
        }

        let accept = Arc::clone(filter);
        let rejected = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&rejected);
        let walker = WalkBuilder::new(target)
            .standard_filters(false)
            .hidden(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 || accept.accept(entry.path()) {
                    return true;
                }
                // Pruned entries never reach the walker's output
                if let Ok(mut rejected) = record.lock() {
                    rejected.push(entry.path().to_path_buf());
                }
                false
            })
            .build();

        for result in walker {
            let entry = result.map_err(|e| DeleteError::Other(e.into()))?;
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if is_dir {
                plan.directories.push(entry.into_path());
            } else {
                plan.files.push(entry.into_path());
            }
        }

        plan.skipped = rejected
            .lock()
            .map(|mut rejected| std::mem::take(&mut *rejected))
            .map_err(|e| DeleteError::Other(anyhow::anyhow!("{}", e)))?;

        let skipped = &plan.skipped;
        plan.directories
            .retain(|dir| !skipped.iter().any(|s| s.starts_with(dir)));

        Ok(plan)
    }

    /// Whether anything at all would be removed.
    pub fn is_noop(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }
}

/// Preview of a whole batch.
#[derive(Debug, Clone, Default)]
pub struct DeletePlan {
    pub targets: Vec<TargetPlan>,
}

impl DeletePlan {
    /// Walks every target without modifying anything.
    pub fn build(targets: &[PathBuf], filter: &Arc<dyn EntryFilter>) -> Result<Self> {
        let targets = targets
            .iter()
            .map(|t| TargetPlan::build(t, filter))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { targets })
    }

    pub fn total_files(&self) -> usize {
        self.targets.iter().map(|t| t.files.len()).sum()
    }

    pub fn total_directories(&self) -> usize {
        self.targets.iter().map(|t| t.directories.len()).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.targets.iter().map(|t| t.skipped.len()).sum()
    }

    pub fn is_noop(&self) -> bool {
        self.targets.iter().all(TargetPlan::is_noop)
    }

    /// Prints the plan to stdout, paths relative to `base`.
    pub fn print(&self, base: &Path, dry_run: bool) {
        let display_path = |path: &Path| -> String {
            let relative = pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf());
            relative.to_string_lossy().replace('\\', "/")
        };

        if dry_run {
            println!("\n{}", "DRY RUN - Nothing will be deleted".yellow().bold());
        } else {
            println!("\n{}", "Delete Plan:".bold().cyan());
        }

        for target in &self.targets {
            let shown = display_path(&target.target);
            if !target.exists {
                println!("\n{} {} {}", "∅".dimmed(), shown, "(does not exist)".dimmed());
                continue;
            }

            println!(
                "\n{} {} ({} file{}, {} director{})",
                "🗑".bold(),
                shown.bold(),
                target.files.len(),
                if target.files.len() == 1 { "" } else { "s" },
                target.directories.len(),
                if target.directories.len() == 1 { "y" } else { "ies" }
            );

            for path in target.files.iter().take(8) {
                println!("   • {}", display_path(path).dimmed());
            }
            if target.files.len() > 8 {
                println!("   • ... and {} more", target.files.len() - 8);
            }

            if !target.skipped.is_empty() {
                println!(
                    "   {} {} entr{} kept by filter",
                    "⊘".yellow(),
                    target.skipped.len(),
                    if target.skipped.len() == 1 { "y" } else { "ies" }
                );
                for path in target.skipped.iter().take(5) {
                    println!("     {}", display_path(path).yellow());
                }
                if target.skipped.len() > 5 {
                    println!("     ... and {} more", target.skipped.len() - 5);
                }
            }
        }

        println!();
        let files = self.total_files();
        let dirs = self.total_directories();
        if dry_run {
            println!(
                "{} file{} and {} director{} would be deleted. Run without {} to apply.",
                files.to_string().cyan().bold(),
                if files == 1 { "" } else { "s" },
                dirs.to_string().cyan().bold(),
                if dirs == 1 { "y" } else { "ies" },
                "--dry-run".cyan()
            );
        }
    }
}
