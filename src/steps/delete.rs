//! Orchestration logic for the `delete` subcommand.
//!
//! All file system modifications go through [`execute_all`] for atomicity.

use crate::config::Config;
use crate::error::{DeleteError, Result};
use crate::filter::{EntryFilter, NameFilter};
use crate::fs::{DeleteOp, DeletePlan, DeleteStats, execute_all};
use crate::verify::{confirm_operation, preflight_checks};

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the `delete` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    /// Files or directories to delete
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Keep entries whose file name matches REGEX (repeatable)
    ///
    /// Examples:
    ///   --exclude '^README$'     Keep every README
    ///   --exclude '\.lock$'      Keep lock files
    #[arg(long, short = 'x', value_name = "REGEX", verbatim_doc_comment)]
    pub exclude: Vec<String>,

    /// Name of the backup directory created next to each target [default: .bkp]
    #[arg(long, value_name = "NAME")]
    pub backup_dir: Option<String>,

    /// Path to a configuration file (defaults to ./txn-delete.toml if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Preview what would be deleted without touching anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Skip interactive confirmation
    #[arg(long = "yes", short = 'y')]
    pub skip_confirmation: bool,
}

pub fn execute(args: DeleteArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(args.config.as_deref(), &cwd)?;

    let backup_dir = args.backup_dir.clone().unwrap_or(config.backup_dir.clone());
    let targets = preflight_checks(&args.paths, &backup_dir)?;

    let filter = NameFilter::new(config.exclude.iter().chain(args.exclude.iter()))?;
    if !filter.is_empty() {
        log::debug!("Excluding names matching: {}", filter.patterns().join(", "));
    }
    let filter: Arc<dyn EntryFilter> = Arc::new(filter);

    let plan = DeletePlan::build(&targets, &filter)?;

    if args.dry_run {
        plan.print(&cwd, true);
        return Ok(());
    }

    if plan.is_noop() {
        println!("{}", "Nothing to delete".yellow());
        return Ok(());
    }

    let skip = args.skip_confirmation || !config.confirm;
    if !confirm_operation(&plan, &cwd, skip)? {
        println!("\n{}", "Operation cancelled.".yellow());
        return Err(DeleteError::Cancelled);
    }

    let mut ops: Vec<_> = targets
        .iter()
        .map(|target| {
            DeleteOp::new(target)
                .with_shared_filter(Arc::clone(&filter))
                .backup_dir_name(&backup_dir)
        })
        .collect();

    match execute_all(&mut ops) {
        Ok(stats) => {
            print_summary(&stats);
            Ok(())
        }
        Err(e @ DeleteError::BackupCleanupFailed(_)) => {
            eprintln!(
                "{} Targets were deleted, but backup copies remain on disk.",
                "Warning:".yellow().bold()
            );
            eprintln!(
                "Run {} to remove them.",
                format!("txn-delete clean --backup-dir {} <DIR>", backup_dir).cyan()
            );
            Err(e)
        }
        Err(e) => {
            eprintln!(
                "{} Nothing was deleted; all targets were restored.",
                "✗".red().bold()
            );
            Err(e)
        }
    }
}

fn print_summary(stats: &DeleteStats) {
    println!(
        "{} Deleted {} file{} and {} director{}",
        "✓".green().bold(),
        stats.files_staged.to_string().green().bold(),
        if stats.files_staged == 1 { "" } else { "s" },
        stats.dirs_removed.to_string().green().bold(),
        if stats.dirs_removed == 1 { "y" } else { "ies" }
    );
}
