use clap::{ArgAction, Parser, Subcommand};

use crate::steps::{CleanArgs, DeleteArgs};

#[derive(Parser)]
#[command(name = "txn-delete", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Delete files or directories all-or-nothing.
    Delete(DeleteArgs),

    /// Remove backup copies left behind by a failed delete.
    Clean(CleanArgs),
}
