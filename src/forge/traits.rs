//! forge::traits
//!
//! Content store trait definition for git-data primitives.
//!
//! # Design
//!
//! The `ContentStore` trait is async because every primitive involves network
//! I/O. All methods return `Result` instead of the "falsy on failure" shape
//! of raw REST helpers, so a publisher can tell which step failed and why.
//!
//! Primitives are deliberately low-level. Composing them into a publish
//! (blobs, then tree, commit and ref) is the job of [`crate::publish`].
//!
//! # Example
//!
//! ```ignore
//! use gitpix::forge::{ContentStore, ForgeError};
//!
//! async fn head(store: &dyn ContentStore) -> Result<String, ForgeError> {
//!     let snapshot = store.get_branch("octocat", "pics", "main").await?;
//!     Ok(snapshot.head_commit_sha)
//! }
//! ```

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::core::types::{BranchSnapshot, RemoteFile};

/// Errors from forge operations.
///
/// These error types map to common failure modes when interacting
/// with remote hosting services like GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The update was rejected because the target moved or already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// A blob accepted by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    /// Content hash assigned by the store
    pub sha: String,
}

/// One path to blob mapping in a new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Blob content hash
    pub sha: String,
    /// Path relative to the repository root
    pub path: String,
}

/// A tree created by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRef {
    pub sha: String,
}

/// A commit created by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    pub sha: String,
}

/// Result of moving a branch ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    /// Fully qualified ref, e.g. `refs/heads/main`
    pub ref_name: String,
    /// Commit the ref now points at
    pub sha: String,
}

/// Committer identity attached to a contents upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// Body of a "put file contents" request.
///
/// `committer` is omitted from the wire format when `None`, letting the
/// server default the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutFileRequest {
    pub message: String,
    pub branch: String,
    /// Base64 file content
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer: Option<Committer>,
}

/// Git-data primitives of a remote content repository.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so blob uploads can be driven
/// concurrently.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. No method retries; retry
/// policy belongs to the caller.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Get the store name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Fetch the head commit and its root tree for `branch`.
    async fn get_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<BranchSnapshot, ForgeError>;

    /// Store base64 `content` as a blob.
    async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content: &str,
    ) -> Result<BlobRef, ForgeError>;

    /// Create a tree layering `entries` over the snapshot's root tree.
    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        entries: &[TreeEntry],
        base: &BranchSnapshot,
    ) -> Result<TreeRef, ForgeError>;

    /// Create a commit of `tree` whose parent is the snapshot's head.
    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        message: &str,
        tree: &TreeRef,
        base: &BranchSnapshot,
    ) -> Result<CommitRef, ForgeError>;

    /// Point `branch` at `commit_sha`.
    ///
    /// # Errors
    ///
    /// - `Conflict` when the update is not a fast-forward and the store
    ///   was not configured to force it
    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        commit_sha: &str,
    ) -> Result<RefUpdate, ForgeError>;

    /// Create or replace a single file at `path` in one call.
    async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &PutFileRequest,
    ) -> Result<RemoteFile, ForgeError>;
}
