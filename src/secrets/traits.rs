//! secrets::traits
//!
//! Key-value interface for credentials.
//!
//! Keys are namespaced, e.g. `github.pat`. Implementations never log or
//! print values and never put them in error messages.

use thiserror::Error;

/// Errors from secret storage. Messages never contain secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read secret: {0}")]
    ReadError(String),

    #[error("failed to write secret: {0}")]
    WriteError(String),

    /// Unknown or unusable provider.
    #[error("secret provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// A secret storage provider.
pub trait SecretStore: Send + Sync {
    /// Value for `key`, `Ok(None)` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Remove `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            SecretError::ReadError("disk".into()).to_string(),
            "failed to read secret: disk"
        );
        assert!(SecretError::ProviderNotAvailable("vault".into())
            .to_string()
            .contains("provider"));
    }
}
