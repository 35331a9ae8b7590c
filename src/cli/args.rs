//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Debug logging
//! - `--verbose` / `-v`: Info logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitpix - Publish images to a GitHub repository
#[derive(Parser, Debug)]
#[command(name = "gitpix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log progress of each publish step
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Default log filter for the flags given.
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload images to the configured repository
    #[command(
        name = "upload",
        long_about = "Upload one or more images to a GitHub repository.\n\n\
            By default every image is uploaded as a blob and the batch lands as a \
            single commit on the target branch. With --single, one image is \
            written through the contents API instead.",
        after_help = "\
EXAMPLES:
    # Upload two screenshots into photos/ on main
    gitpix upload a.png b.png --owner octocat --repo pics --dir photos

    # Target taken from a repository URL
    gitpix upload cat.png --remote https://github.com/octocat/pics

    # Replace a previously uploaded image in place
    gitpix upload new.png --single --re-upload-path archive/old.png --re-upload-dir archive"
    )]
    Upload(UploadArgs),

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        after_help = "\
EXAMPLES:
    gitpix config set owner octocat
    gitpix config set repo pics
    gitpix config get branch
    gitpix config list"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Store, check, or remove the GitHub token
    #[command(
        name = "auth",
        long_about = "Store a GitHub personal access token.\n\n\
            The token needs write access to repository contents. It is stored in \
            ~/.gitpix/secrets.toml with owner-only permissions. $GITPIX_TOKEN and \
            $GITHUB_TOKEN take precedence over the stored token.",
        after_help = "\
EXAMPLES:
    # Prompt for the token (input is hidden)
    gitpix auth

    # Non-interactive
    gitpix auth --token ghp_xxxx

    # Check which token would be used
    gitpix auth --status

    # Remove the stored token
    gitpix auth --logout"
    )]
    Auth {
        /// Token to store (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,

        /// Show current authentication status
        #[arg(long, conflicts_with_all = ["token", "logout"])]
        status: bool,

        /// Remove the stored token
        #[arg(long, conflicts_with = "token")]
        logout: bool,
    },
}

/// Arguments of `gitpix upload`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct UploadArgs {
    /// Image files to upload
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Repository owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Repository URL, e.g. https://github.com/owner/repo
    #[arg(long, conflicts_with_all = ["owner", "repo"])]
    pub remote: Option<String>,

    /// Target branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Target directory ("/" for the repository root)
    #[arg(long)]
    pub dir: Option<String>,

    /// Committer email for --single uploads
    #[arg(long)]
    pub email: Option<String>,

    /// Upload one image through the contents API
    #[arg(long)]
    pub single: bool,

    /// Concurrent blob uploads
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Path of the image being replaced
    #[arg(long, requires = "re_upload_dir")]
    pub re_upload_path: Option<String>,

    /// Directory of the image being replaced
    #[arg(long, requires = "re_upload_path")]
    pub re_upload_dir: Option<String>,

    /// Print uploaded records as JSON
    #[arg(long)]
    pub json: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}
