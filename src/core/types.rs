//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`UserConfig`] - Per-call snapshot of the publish target
//! - [`UploadItem`] - A local image queued for publishing
//! - [`UploadedImage`] - Durable record of a published image
//! - [`BranchSnapshot`] - Head of the target branch at publish time
//! - [`BlobResult`] - Pairing of an item with its remote content hash
//! - [`RemoteFile`] - Server-confirmed file descriptor
//!
//! # Examples
//!
//! ```
//! use gitpix::core::types::{BranchName, ImagePayload, UploadItem};
//!
//! let branch = BranchName::new("main").unwrap();
//! assert_eq!(branch.as_str(), "main");
//! assert!(BranchName::new("invalid..name").is_err());
//!
//! let item = UploadItem::new("cat.png", ImagePayload::Bytes(vec![1, 2, 3]));
//! assert!(!item.upload_status.uploading);
//! assert!(item.uploaded.is_none());
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::paths::{normalize_dir, ROOT_DIR};

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
/// - Cannot be exactly `@`
///
/// # Example
///
/// ```
/// use gitpix::core::types::BranchName;
///
/// let name = BranchName::new("images/2024").unwrap();
/// assert_eq!(name.as_str(), "images/2024");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be empty".into(),
            ));
        }

        if name == "@" {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be '@' (reserved)".into(),
            ));
        }

        if name.starts_with('.') || name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot start with '{}'",
                &name[..1]
            )));
        }

        if name.ends_with(".lock") || name.ends_with('/') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '.lock' or '/'".into(),
            ));
        }

        for pattern in ["..", "@{", "//"] {
            if name.contains(pattern) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{pattern}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{c}'"
                )));
            }
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain control characters".into(),
            ));
        }

        for component in name.split('/').filter(|c| !c.is_empty()) {
            if component.starts_with('.') || component.ends_with(".lock") {
                return Err(TypeError::InvalidBranchName(format!(
                    "invalid path component '{component}'"
                )));
            }
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable snapshot of where a publish call writes to.
///
/// `selected_dir` uses `"/"` as the root sentinel; other directories are
/// stored without leading or trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub selected_repo: String,
    /// Target branch
    pub selected_branch: String,
    /// Target directory inside the repository
    pub selected_dir: String,
    /// Committer email for single-image uploads
    pub email: Option<String>,
}

impl UserConfig {
    /// Build a config, normalizing the directory.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        dir: &str,
    ) -> Self {
        Self {
            owner: owner.into(),
            selected_repo: repo.into(),
            selected_branch: branch.into(),
            selected_dir: normalize_dir(dir),
            email: None,
        }
    }

    /// Set the committer email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Whether the target directory is the repository root.
    pub fn is_root_dir(&self) -> bool {
        normalize_dir(&self.selected_dir) == ROOT_DIR
    }
}

/// Image content as handed to the publisher.
#[derive(Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// Raw file bytes
    Bytes(Vec<u8>),
    /// Already base64-encoded content
    Base64(String),
}

impl ImagePayload {
    /// Base64 form of the payload, as the contents and blob APIs expect.
    pub fn to_base64(&self) -> String {
        match self {
            ImagePayload::Bytes(bytes) => STANDARD.encode(bytes),
            ImagePayload::Base64(content) => content.clone(),
        }
    }

    /// Decoded size in bytes.
    pub fn len(&self) -> usize {
        match self {
            ImagePayload::Bytes(bytes) => bytes.len(),
            ImagePayload::Base64(content) => {
                let padding = content.bytes().rev().take_while(|b| *b == b'=').count();
                (content.len() / 4 * 3).saturating_sub(padding)
            }
        }
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Image bytes are never worth printing.
impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImagePayload::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            ImagePayload::Base64(s) => write!(f, "Base64({} chars)", s.len()),
        }
    }
}

/// Upload progress of a single item, observed by the UI layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStatus {
    /// A remote call for this item is in flight
    pub uploading: bool,
    /// Percentage, 0..=100
    pub progress: u8,
}

/// Marks an item as replacing a previously published image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReUploadInfo {
    pub is_re_upload: bool,
    /// Directory of the original upload
    pub dir: String,
    /// Full remote path of the original upload
    pub path: String,
}

/// A local image queued for publishing.
///
/// Owned by the caller; publishers update `upload_status` and `uploaded`
/// in place.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub uuid: Uuid,
    pub payload: ImagePayload,
    /// Final (already normalized) filename
    pub filename: String,
    pub upload_status: UploadStatus,
    pub re_upload: Option<ReUploadInfo>,
    /// Attached once the item is published
    pub uploaded: Option<UploadedImage>,
}

impl UploadItem {
    /// Create a fresh item with a random identity.
    pub fn new(filename: impl Into<String>, payload: ImagePayload) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            payload,
            filename: filename.into(),
            upload_status: UploadStatus::default(),
            re_upload: None,
            uploaded: None,
        }
    }

    /// Mark this item as a re-upload of an existing remote image.
    pub fn with_re_upload(mut self, dir: impl Into<String>, path: impl Into<String>) -> Self {
        self.re_upload = Some(ReUploadInfo {
            is_re_upload: true,
            dir: dir.into(),
            path: path.into(),
        });
        self
    }

    /// The re-upload info, if this item is a re-upload.
    pub fn active_re_upload(&self) -> Option<&ReUploadInfo> {
        self.re_upload.as_ref().filter(|info| info.is_re_upload)
    }
}

/// Durable record of a published image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub dir: String,
    pub name: String,
    #[serde(rename = "sha")]
    pub content_hash: String,
    pub path: String,
    pub size: u64,
    pub checked: bool,
    pub deleting: bool,
}

/// Record kind for images.
pub const IMAGE_KIND: &str = "image";

/// Head of the target branch, fetched fresh for every batch publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSnapshot {
    /// Root tree of the head commit
    pub tree_sha: String,
    /// Head commit
    pub head_commit_sha: String,
}

/// An item whose blob the remote store accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobResult {
    /// Position of the item in the publish call's input
    pub index: usize,
    pub uuid: Uuid,
    pub content_hash: String,
}

/// Server-confirmed file descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    #[serde(rename = "sha")]
    pub content_hash: String,
    pub path: String,
    pub size: u64,
}
