//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls into `publish`, `core::config` or `secrets`
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `upload` talks to GitHub and is async. Its handler builds a tokio runtime
//! and blocks on the publish, keeping dispatch synchronous.

mod auth;
mod config_cmd;
mod upload;

pub use auth::{auth, github_token};
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use upload::{load_items, upload};

use std::io::IsTerminal;

use anyhow::Result;

use crate::cli::args::{Command, ConfigAction};
use crate::ui::output::Verbosity;

/// Per-invocation settings derived from global flags.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub verbosity: Verbosity,
    /// Prompts are allowed
    pub interactive: bool,
}

impl Context {
    pub fn quiet(&self) -> bool {
        self.verbosity.is_quiet()
    }
}

/// Whether stdin is attached to a terminal.
pub fn stdin_is_terminal() -> bool {
    std::io::stdin().is_terminal()
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Upload(args) => upload::upload(ctx, &args),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Auth {
            token,
            status,
            logout,
        } => auth::auth(ctx, token.as_deref(), status, logout),
    }
}
