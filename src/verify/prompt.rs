//! User confirmation prompt for delete operations.
//!
//! Displays the plan and waits for confirmation. Skipped when `--yes` or
//! `--dry-run` is given, or when the configuration disables it.

use crate::error::Result;
use crate::fs::DeletePlan;
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Prompts the user for confirmation before deleting.
///
/// # Returns
///
/// - `Ok(true)` if the user confirms or the prompt is skipped
/// - `Ok(false)` if the user declines, or stdin is not a terminal
///
/// # Errors
///
/// Returns `Err` only on I/O errors reading stdin.
pub fn confirm_operation(plan: &DeletePlan, base: &Path, skip: bool) -> Result<bool> {
    if skip {
        return Ok(true);
    }

    if !io::stdin().is_terminal() {
        log::warn!("Non-interactive terminal detected. Use --yes to confirm automatically.");
        return Ok(false);
    }

    plan.print(base, false);

    let files = plan.total_files();
    let dirs = plan.total_directories();
    print!(
        "{} {} file{} and {} director{}? {} ",
        "Delete".bold(),
        files,
        if files == 1 { "" } else { "s" },
        dirs,
        if dirs == 1 { "y" } else { "ies" },
        "(y/N)".dimmed()
    );
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;

    let confirmed =
        response.trim().eq_ignore_ascii_case("y") || response.trim().eq_ignore_ascii_case("yes");

    if !confirmed {
        log::info!("Delete cancelled by user");
    }

    Ok(confirmed)
}
