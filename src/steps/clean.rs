//! Removal of backup copies left behind by failed commits.

use crate::config::Config;
use crate::error::{DeleteError, Result};
use crate::filter::{AcceptAll, EntryFilter};
use crate::fs::backup::{find_stale_backups, remove_tree};
use crate::fs::{DeletePlan, StdFileSystem};
use crate::verify::{confirm_operation, validate_backup_dir_name};

use clap::Parser;
use colored::Colorize;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the `clean` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CleanArgs {
    /// Directories to look for stale backups in
    #[arg(required = true, value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Name of the backup directory [default: .bkp]
    #[arg(long, value_name = "NAME")]
    pub backup_dir: Option<String>,

    /// Path to a configuration file (defaults to ./txn-delete.toml if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List stale backups without removing them
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Skip interactive confirmation
    #[arg(long = "yes", short = 'y')]
    pub skip_confirmation: bool,
}

pub fn execute(args: CleanArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(args.config.as_deref(), &cwd)?;

    let backup_dir = args.backup_dir.clone().unwrap_or(config.backup_dir.clone());
    validate_backup_dir_name(&backup_dir)?;

    let stale = find_stale_backups(&args.dirs, OsStr::new(&backup_dir))?;
    if stale.is_empty() {
        println!("{}", "No stale backups found".green());
        return Ok(());
    }

    for (root, mirrors) in &stale {
        log::info!(
            "Found {} stale backup{} in {}",
            mirrors.len(),
            if mirrors.len() == 1 { "" } else { "s" },
            root.display()
        );
    }

    let roots: Vec<PathBuf> = stale.into_iter().map(|(root, _)| root).collect();
    let accept_all: Arc<dyn EntryFilter> = Arc::new(AcceptAll);
    let plan = DeletePlan::build(&roots, &accept_all)?;

    if args.dry_run {
        plan.print(&cwd, true);
        return Ok(());
    }

    let skip = args.skip_confirmation || !config.confirm;
    if !confirm_operation(&plan, &cwd, skip)? {
        println!("\n{}", "Operation cancelled.".yellow());
        return Err(DeleteError::Cancelled);
    }

    let mut first_failure = None;
    let mut removed = 0;
    for root in roots {
        let removal = remove_tree(&StdFileSystem, &root);
        removed += removal.removed;
        if removal.is_complete() {
            log::info!("Removed {}", root.display());
        } else {
            log::warn!(
                "{} entr{} left in {}",
                removal.failed,
                if removal.failed == 1 { "y" } else { "ies" },
                root.display()
            );
            first_failure.get_or_insert(root);
        }
    }

    match first_failure {
        Some(root) => Err(DeleteError::BackupCleanupFailed(root)),
        None => {
            println!(
                "{} Removed {} backup entr{}",
                "✓".green().bold(),
                removed.to_string().green().bold(),
                if removed == 1 { "y" } else { "ies" }
            );
            Ok(())
        }
    }
}
