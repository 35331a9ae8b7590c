//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (passed in as [`TargetOverrides`])
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$GITPIX_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitpix/config.toml`
//! 3. `~/.gitpix/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use gitpix::core::config::{Config, TargetOverrides};
//!
//! let config = Config::load().unwrap();
//! let target = config.user_config(&TargetOverrides::default()).unwrap();
//! println!("Publishing to {}/{}", target.owner, target.selected_repo);
//! ```

pub mod schema;

pub use schema::{GlobalConfig, SecretsConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::paths::normalize_dir;
use crate::core::types::UserConfig;

/// Default branch when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GITPIX_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("missing required setting '{0}' (set it with `gitpix config set {0} <value>` or a flag)")]
    Missing(&'static str),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Per-invocation overrides, usually from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct TargetOverrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub dir: Option<String>,
    pub email: Option<String>,
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File contents (defaults if no file was found)
    pub global: GlobalConfig,
    /// Path the config was loaded from, if any
    path: Option<PathBuf>,
}

/// Candidate config locations, in lookup order.
#[derive(Debug, Default)]
struct ConfigPaths {
    explicit: Option<PathBuf>,
    xdg: Option<PathBuf>,
    home: Option<PathBuf>,
}

impl ConfigPaths {
    fn from_env() -> Self {
        Self {
            explicit: std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            xdg: std::env::var_os("XDG_CONFIG_HOME")
                .map(|dir| PathBuf::from(dir).join("gitpix/config.toml")),
            home: dirs::home_dir().map(|home| home.join(".gitpix/config.toml")),
        }
    }

    fn existing(&self) -> Option<PathBuf> {
        [&self.explicit, &self.xdg, &self.home]
            .into_iter()
            .flatten()
            .find(|path| path.exists())
            .cloned()
    }

    fn write_target(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.explicit {
            return Ok(path.clone());
        }
        if let Some(path) = self.existing() {
            return Ok(path);
        }
        self.home.clone().ok_or(ConfigError::NoHomeDir)
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    /// A missing config file is not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        global.validate()?;

        log::debug!("loaded config from {}", path.display());
        Ok(Self {
            global,
            path: Some(path.to_path_buf()),
        })
    }

    /// Find the first existing config file.
    fn locate() -> Option<PathBuf> {
        ConfigPaths::from_env().existing()
    }

    /// Where `write` stores the config.
    ///
    /// `$GITPIX_CONFIG` when set, otherwise the file `load` reads, otherwise
    /// `~/.gitpix/config.toml`.
    pub fn write_path() -> Result<PathBuf, ConfigError> {
        ConfigPaths::from_env().write_target()
    }

    /// Write config atomically to `path`.
    ///
    /// Creates parent directories if needed.
    pub fn write_to(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Build the publish target, applying overrides on top of the file.
    ///
    /// # Errors
    ///
    /// `ConfigError::Missing` when owner or repo is not set anywhere.
    pub fn user_config(&self, overrides: &TargetOverrides) -> Result<UserConfig, ConfigError> {
        let pick = |flag: &Option<String>, file: &Option<String>| {
            flag.clone()
                .or_else(|| file.clone())
                .filter(|v| !v.trim().is_empty())
        };

        let owner =
            pick(&overrides.owner, &self.global.owner).ok_or(ConfigError::Missing("owner"))?;
        let repo =
            pick(&overrides.repo, &self.global.repo).ok_or(ConfigError::Missing("repo"))?;
        let branch = pick(&overrides.branch, &self.global.branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        crate::core::types::BranchName::new(&branch)
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        let dir = pick(&overrides.dir, &self.global.dir).unwrap_or_default();

        Ok(UserConfig {
            owner,
            selected_repo: repo,
            selected_branch: branch,
            selected_dir: normalize_dir(&dir),
            email: pick(&overrides.email, &self.global.email),
        })
    }

    /// Whether ref updates are forced.
    ///
    /// Defaults to `false` (a moved branch fails the publish).
    pub fn force_ref_update(&self) -> bool {
        self.global.force_ref_update.unwrap_or(false)
    }

    /// Concurrent blob uploads.
    ///
    /// Defaults to 1.
    pub fn concurrency(&self) -> usize {
        self.global.concurrency.unwrap_or(1).max(1)
    }

    /// API base URL override.
    pub fn api_base(&self) -> Option<&str> {
        self.global.api_base.as_deref()
    }

    /// Get the secrets provider.
    ///
    /// Defaults to "file" if not configured.
    pub fn secrets_provider(&self) -> &str {
        self.global
            .secrets
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or("file")
    }

    /// Path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
