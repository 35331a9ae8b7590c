//! cli::commands::auth
//!
//! Stores the GitHub token used for uploads.
//!
//! The token is written to the secret store and is never printed. `--status`
//! reports where the token would come from, not the token itself.

use std::io::{self, Write};

use anyhow::{bail, Context as _, Result};

use super::Context;
use crate::core::config::Config;
use crate::secrets::{self, SecretStore, TOKEN_KEY};
use crate::ui::output;

/// Run the auth command.
pub fn auth(ctx: &Context, token: Option<&str>, status: bool, logout: bool) -> Result<()> {
    let store = open_store()?;

    if status {
        return show_status(store.as_ref(), ctx);
    }
    if logout {
        store
            .delete(TOKEN_KEY)
            .context("Failed to remove stored token")?;
        output::success("Removed stored GitHub token.", ctx.verbosity);
        return Ok(());
    }

    let token = read_token(ctx, token)?;
    validate_token(&token)?;
    store.set(TOKEN_KEY, &token).context("Failed to store token")?;

    output::success("GitHub token stored.", ctx.verbosity);
    Ok(())
}

/// The token to upload with.
///
/// # Errors
///
/// Fails with a hint to run `gitpix auth` when no token is configured.
pub fn github_token() -> Result<String> {
    let store = open_store()?;
    match secrets::resolve_token(store.as_ref())? {
        Some((token, source)) => {
            log::debug!("using GitHub token from {}", source);
            Ok(token)
        }
        None => bail!(
            "Not authenticated. Run 'gitpix auth' or set $GITPIX_TOKEN / $GITHUB_TOKEN."
        ),
    }
}

fn open_store() -> Result<Box<dyn SecretStore>> {
    let config = Config::load().context("Failed to load config")?;
    secrets::create_store(config.secrets_provider()).context("Failed to initialize secret store")
}

fn show_status(store: &dyn SecretStore, ctx: &Context) -> Result<()> {
    let resolved = secrets::resolve_token(store)?;

    if ctx.quiet() {
        // Machine-readable
        println!(
            "{}",
            if resolved.is_some() {
                "authenticated"
            } else {
                "not_authenticated"
            }
        );
    } else if let Some((_, source)) = resolved {
        println!("Authenticated via {}.", source);
    } else {
        println!("Not authenticated.");
        println!("Run 'gitpix auth' to store a token.");
    }
    Ok(())
}

/// Token from the flag, or a masked prompt.
fn read_token(ctx: &Context, token_arg: Option<&str>) -> Result<String> {
    if let Some(token) = token_arg {
        return Ok(token.trim().to_string());
    }

    if !ctx.interactive {
        bail!("Token required. Use --token <TOKEN> or run interactively.");
    }

    print!("GitHub Personal Access Token: ");
    io::stdout().flush()?;
    let token = rpassword::read_password().context("Failed to read token")?;
    Ok(token.trim().to_string())
}

/// Basic format checks. The token is not checked against the API.
fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        bail!("Token cannot be empty.");
    }
    if token.len() < 10 {
        bail!("Token appears to be too short.");
    }
    if token.chars().any(char::is_whitespace) {
        bail!("Token should not contain whitespace.");
    }
    Ok(())
}
