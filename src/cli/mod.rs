//! cli
//!
//! Command-line interface layer for gitpix.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the logger
//! - Delegate to command handlers
//!
//! The CLI layer is thin: it turns files and flags into upload items and a
//! target, then hands them to [`crate::publish`].

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::Result;

use crate::ui::output::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.log_level());

    let ctx = commands::Context {
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        interactive: !cli.quiet && commands::stdin_is_terminal(),
    };

    commands::dispatch(cli.command, &ctx)
}

/// Install `env_logger`. `RUST_LOG` overrides the flag-derived level.
fn init_logging(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    // Fails only when a logger is already installed.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
