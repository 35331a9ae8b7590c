//! secrets::file_store
//!
//! Token storage in `~/.gitpix/secrets.toml`.
//!
//! The file is written atomically (temp file, then rename) and is created
//! with 0600 permissions on Unix. Values never appear in errors or logs.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{SecretError, SecretStore};

/// Secrets file next to the default config file.
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Store at `~/.gitpix/secrets.toml`.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("cannot determine home directory".into()))?;
        Ok(Self {
            path: home.join(".gitpix").join("secrets.toml"),
        })
    }

    /// Store at an explicit path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SecretError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SecretError::ReadError(format!("cannot read secrets file: {}", e)))?;

        // The toml error would quote the offending line, which may be a token.
        toml::from_str(&content)
            .map_err(|_| SecretError::ReadError("cannot parse secrets file".into()))
    }

    fn save(&self, secrets: &BTreeMap<String, String>) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SecretError::WriteError(format!("cannot create directory: {}", e)))?;
        }

        let content = toml::to_string(secrets)
            .map_err(|_| SecretError::WriteError("cannot serialize secrets".into()))?;

        let temp_path = self.path.with_extension("toml.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| SecretError::WriteError(format!("cannot create temp file: {}", e)))?;

            // Restrict before any content lands on disk.
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| SecretError::WriteError(format!("cannot set permissions: {}", e)))?;

            file.write_all(content.as_bytes())
                .and_then(|_| file.sync_all())
                .map_err(|e| SecretError::WriteError(format!("cannot write secrets: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| SecretError::WriteError(format!("cannot replace secrets file: {}", e)))
    }

    /// Whether the file is absent or only readable by its owner.
    #[cfg(unix)]
    pub fn has_private_permissions(&self) -> Result<bool, SecretError> {
        if !self.path.exists() {
            return Ok(true);
        }
        let metadata = fs::metadata(&self.path)
            .map_err(|e| SecretError::ReadError(format!("cannot read file metadata: {}", e)))?;
        Ok(metadata.permissions().mode() & 0o777 == 0o600)
    }

    #[cfg(not(unix))]
    pub fn has_private_permissions(&self) -> Result<bool, SecretError> {
        Ok(true)
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut secrets = self.load()?;
        secrets.insert(key.to_string(), value.to_string());
        self.save(&secrets)
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut secrets = self.load()?;
        if secrets.remove(key).is_some() {
            self.save(&secrets)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileSecretStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        (temp, store)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_temp, store) = store();
        assert!(store.get("github.pat").expect("get").is_none());
        assert!(!store.exists("github.pat").expect("exists"));
    }

    #[test]
    fn set_get_overwrite_delete() {
        let (_temp, store) = store();

        store.set("github.pat", "first").expect("set");
        store.set("github.pat", "second").expect("overwrite");
        assert_eq!(store.get("github.pat").expect("get").as_deref(), Some("second"));

        store.delete("github.pat").expect("delete");
        assert!(store.get("github.pat").expect("get").is_none());
        store.delete("github.pat").expect("delete again");
    }

    #[test]
    fn creates_parent_directory() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(".gitpix").join("secrets.toml");
        let store = FileSecretStore::with_path(&path);

        store.set("github.pat", "t").expect("set");

        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_private() {
        let (_temp, store) = store();
        assert!(store.has_private_permissions().expect("no file yet"));

        store.set("github.pat", "t").expect("set");

        let mode = fs::metadata(store.path()).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(store.has_private_permissions().expect("after write"));
    }

    #[test]
    fn parse_error_does_not_leak_content() {
        let (_temp, store) = store();
        fs::write(store.path(), "github.pat = \"ghp_leak").expect("write bad toml");

        let err = store.get("github.pat").unwrap_err().to_string();

        assert!(err.contains("cannot parse"));
        assert!(!err.contains("ghp_leak"));
    }

    #[test]
    fn values_survive_new_instance() {
        let (temp, store) = store();
        store.set("github.pat", "value with \"quotes\" = and\nnewline").expect("set");

        let reopened = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        assert_eq!(
            reopened.get("github.pat").expect("get").as_deref(),
            Some("value with \"quotes\" = and\nnewline")
        );
    }
}
