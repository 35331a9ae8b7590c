//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order of precedence:
//! 1. `$GITPIX_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitpix/config.toml`
//! 3. `~/.gitpix/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., branch must be a valid branch name).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::paths::normalize_dir;
use crate::core::types::BranchName;

/// User configuration.
///
/// # Example
///
/// ```toml
/// owner = "octocat"
/// repo = "image-host"
/// branch = "main"
/// dir = "screenshots"
/// email = "octocat@example.com"
/// concurrency = 4
///
/// [secrets]
/// provider = "file"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Repository owner (user or organization)
    pub owner: Option<String>,

    /// Repository name
    pub repo: Option<String>,

    /// Target branch (default: "main")
    pub branch: Option<String>,

    /// Target directory (default: "/")
    pub dir: Option<String>,

    /// Committer email for single-image uploads
    pub email: Option<String>,

    /// API base URL (GitHub Enterprise)
    pub api_base: Option<String>,

    /// Force the branch ref update instead of failing when the branch moved
    pub force_ref_update: Option<bool>,

    /// Concurrent blob uploads during a batch publish
    pub concurrency: Option<usize>,

    /// Secret storage settings
    pub secrets: Option<SecretsConfig>,
}

impl GlobalConfig {
    /// Keys accepted by `get_key` / `set_key`.
    pub const KEYS: &'static [&'static str] = &[
        "owner",
        "repo",
        "branch",
        "dir",
        "email",
        "api_base",
        "force_ref_update",
        "concurrency",
        "secrets.provider",
    ];

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(branch) = &self.branch {
            BranchName::new(branch)
                .map_err(|e| ConfigError::InvalidValue(format!("invalid branch: {}", e)))?;
        }

        for (key, value) in [("owner", &self.owner), ("repo", &self.repo)] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!("{} cannot be empty", key)));
            }
        }

        if self.concurrency == Some(0) {
            return Err(ConfigError::InvalidValue(
                "concurrency must be at least 1".to_string(),
            ));
        }

        if let Some(secrets) = &self.secrets {
            secrets.validate()?;
        }

        Ok(())
    }

    /// Read a value by dotted key.
    pub fn get_key(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "owner" => self.owner.clone(),
            "repo" => self.repo.clone(),
            "branch" => self.branch.clone(),
            "dir" => self.dir.clone(),
            "email" => self.email.clone(),
            "api_base" => self.api_base.clone(),
            "force_ref_update" => self.force_ref_update.map(|v| v.to_string()),
            "concurrency" => self.concurrency.map(|v| v.to_string()),
            "secrets.provider" => self.secrets.as_ref().and_then(|s| s.provider.clone()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by dotted key, then re-validate.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let owned = Some(value.to_string());
        match key {
            "owner" => self.owner = owned,
            "repo" => self.repo = owned,
            "branch" => self.branch = owned,
            "dir" => self.dir = Some(normalize_dir(value)),
            "email" => self.email = owned,
            "api_base" => self.api_base = owned,
            "force_ref_update" => {
                self.force_ref_update = Some(value.parse().map_err(|_| {
                    ConfigError::InvalidValue(format!("'{}' is not a boolean", value))
                })?)
            }
            "concurrency" => {
                self.concurrency = Some(value.parse().map_err(|_| {
                    ConfigError::InvalidValue(format!("'{}' is not a number", value))
                })?)
            }
            "secrets.provider" => {
                self.secrets.get_or_insert_with(Default::default).provider = owned
            }
            _ => return Err(unknown_key(key)),
        }
        self.validate()
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::InvalidValue(format!(
        "unknown key '{}', must be one of: {}",
        key,
        GlobalConfig::KEYS.join(", ")
    ))
}

/// Secrets configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Provider to use ("file")
    pub provider: Option<String>,
}

impl SecretsConfig {
    /// Valid secret providers.
    pub const VALID_PROVIDERS: &'static [&'static str] = &["file"];

    /// Validate the secrets configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !Self::VALID_PROVIDERS.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid secrets provider '{}', must be one of: {}",
                    provider,
                    Self::VALID_PROVIDERS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
