//! publish::errors
//!
//! Structural failures of a batch publish.
//!
//! Per-item blob failures are not errors; they are folded into the batch
//! report. Each variant here names the step that aborted the batch and
//! carries the blob hashes that were uploaded before it, which are now
//! unreferenced on the remote.

use thiserror::Error;

use crate::forge::ForgeError;

/// A batch publish aborted before the branch pointed at the new commit.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to fetch branch '{branch}'")]
    BranchFetchFailed {
        branch: String,
        orphaned: Vec<String>,
        #[source]
        source: ForgeError,
    },

    #[error("failed to create tree")]
    TreeBuildFailed {
        orphaned: Vec<String>,
        #[source]
        source: ForgeError,
    },

    #[error("failed to create commit")]
    CommitFailed {
        orphaned: Vec<String>,
        #[source]
        source: ForgeError,
    },

    #[error("failed to update branch '{branch}'")]
    RefUpdateFailed {
        branch: String,
        orphaned: Vec<String>,
        #[source]
        source: ForgeError,
    },
}

impl PublishError {
    /// Stable identifier of the failed step.
    pub fn step(&self) -> &'static str {
        match self {
            PublishError::BranchFetchFailed { .. } => "branch-fetch-failed",
            PublishError::TreeBuildFailed { .. } => "tree-failed",
            PublishError::CommitFailed { .. } => "commit-failed",
            PublishError::RefUpdateFailed { .. } => "ref-failed",
        }
    }

    /// Blob hashes uploaded before the failure and now unreferenced.
    pub fn orphaned_blobs(&self) -> &[String] {
        match self {
            PublishError::BranchFetchFailed { orphaned, .. }
            | PublishError::TreeBuildFailed { orphaned, .. }
            | PublishError::CommitFailed { orphaned, .. }
            | PublishError::RefUpdateFailed { orphaned, .. } => orphaned,
        }
    }

    /// Whether some blobs exist remotely without being referenced.
    ///
    /// `false` means nothing at all reached the remote store.
    pub fn blobs_orphaned(&self) -> bool {
        !self.orphaned_blobs().is_empty()
    }

    /// The underlying forge error.
    pub fn forge_error(&self) -> &ForgeError {
        match self {
            PublishError::BranchFetchFailed { source, .. }
            | PublishError::TreeBuildFailed { source, .. }
            | PublishError::CommitFailed { source, .. }
            | PublishError::RefUpdateFailed { source, .. } => source,
        }
    }

    /// Whether the branch moved between the snapshot and the ref update.
    pub fn is_branch_moved(&self) -> bool {
        matches!(
            self,
            PublishError::RefUpdateFailed {
                source: ForgeError::Conflict(_),
                ..
            }
        )
    }
}
