#![doc = include_str!("../README.md")]

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod fs;
pub mod steps;
pub mod verify;

pub use error::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<()> {
    use clap::Parser;
    use cli::Command;

    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Delete(args) => steps::delete::execute(args),
        Command::Clean(args) => steps::clean::execute(args),
    }
}

/// Routes `log` output to stderr. `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}
