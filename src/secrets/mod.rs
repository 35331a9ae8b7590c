//! secrets
//!
//! Storage and lookup of the GitHub token.
//!
//! # Lookup order
//!
//! 1. `$GITPIX_TOKEN`
//! 2. `$GITHUB_TOKEN`
//! 3. `github.pat` in the configured [`SecretStore`]
//!
//! Tokens are never logged or included in error messages.

mod file_store;
mod traits;

pub use file_store::FileSecretStore;
pub use traits::{SecretError, SecretStore};

/// The default secret store provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Key under which the GitHub token is stored.
pub const TOKEN_KEY: &str = "github.pat";

/// Environment variables checked before the store, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITPIX_TOKEN", "GITHUB_TOKEN"];

/// Where a resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Env(&'static str),
    Store,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Env(var) => write!(f, "${}", var),
            TokenSource::Store => write!(f, "secret store ({})", TOKEN_KEY),
        }
    }
}

/// Create a secret store for a provider name.
pub fn create_store(provider: &str) -> Result<Box<dyn SecretStore>, SecretError> {
    match provider {
        "file" => Ok(Box::new(FileSecretStore::new()?)),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unknown secret provider: '{}' (valid: file)",
            other
        ))),
    }
}

/// Resolve the GitHub token from the process environment, then `store`.
pub fn resolve_token(
    store: &dyn SecretStore,
) -> Result<Option<(String, TokenSource)>, SecretError> {
    resolve_token_with(store, |var| std::env::var(var).ok())
}

/// Resolve the GitHub token using `env` for variable lookup.
///
/// Empty variables are skipped.
pub fn resolve_token_with(
    store: &dyn SecretStore,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Option<(String, TokenSource)>, SecretError> {
    for var in TOKEN_ENV_VARS {
        if let Some(token) = env(var).filter(|t| !t.trim().is_empty()) {
            log::debug!("using token from ${}", var);
            return Ok(Some((token, TokenSource::Env(var))));
        }
    }

    Ok(store
        .get(TOKEN_KEY)?
        .filter(|t| !t.trim().is_empty())
        .map(|token| (token, TokenSource::Store)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(token: Option<&str>) -> (TempDir, FileSecretStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        if let Some(token) = token {
            store.set(TOKEN_KEY, token).expect("set");
        }
        (temp, store)
    }

    #[test]
    fn unknown_provider_is_rejected() {
        match create_store("keychain") {
            Err(SecretError::ProviderNotAvailable(msg)) => assert!(msg.contains("keychain")),
            Err(e) => panic!("unexpected error: {:?}", e),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn gitpix_token_wins() {
        let (_temp, store) = store_with(Some("stored"));
        let env = |var: &str| match var {
            "GITPIX_TOKEN" => Some("mine".to_string()),
            "GITHUB_TOKEN" => Some("ci".to_string()),
            _ => None,
        };

        let (token, source) = resolve_token_with(&store, env).unwrap().unwrap();

        assert_eq!(token, "mine");
        assert_eq!(source, TokenSource::Env("GITPIX_TOKEN"));
    }

    #[test]
    fn github_token_before_store() {
        let (_temp, store) = store_with(Some("stored"));
        let env = |var: &str| (var == "GITHUB_TOKEN").then(|| "ci".to_string());

        let (token, source) = resolve_token_with(&store, env).unwrap().unwrap();

        assert_eq!(token, "ci");
        assert_eq!(source.to_string(), "$GITHUB_TOKEN");
    }

    #[test]
    fn falls_back_to_store_and_skips_blank_env() {
        let (_temp, store) = store_with(Some("stored"));
        let env = |_: &str| Some("  ".to_string());

        let (token, source) = resolve_token_with(&store, env).unwrap().unwrap();

        assert_eq!(token, "stored");
        assert_eq!(source, TokenSource::Store);
    }

    #[test]
    fn nothing_configured() {
        let (_temp, store) = store_with(None);
        assert!(resolve_token_with(&store, |_| None).unwrap().is_none());
    }
}
