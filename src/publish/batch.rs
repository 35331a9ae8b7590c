//! publish::batch
//!
//! Publishes many images as one commit.
//!
//! # Protocol
//!
//! 1. Upload every item as a blob. Failures are reported per item and
//!    dropped from the batch.
//! 2. Fetch the branch head.
//! 3. Build one tree containing every uploaded blob, based on the head tree.
//! 4. Commit that tree on top of the head.
//! 5. Move the branch to the commit.
//! 6. Reconcile local state for every uploaded item.
//!
//! The branch is fetched even when no blob was uploaded, so an unreachable
//! branch is always an error; only steps 3 to 5 are skipped in that case.
//! Steps 2 to 5 are all-or-nothing: if any of them fails the batch returns a
//! [`PublishError`] and nothing is reconciled. Blobs uploaded in step 1 stay
//! on the remote unreferenced; the error lists them.

use uuid::Uuid;

use super::blob::{upload_all, BlobFold};
use super::errors::PublishError;
use super::reconcile::reconcile;
use super::state::{StateCommand, StateSink};
use super::{PublishOptions, UPLOAD_COMMIT_MESSAGE};
use crate::core::paths::dir_prefix;
use crate::core::types::{BlobResult, RemoteFile, UploadItem, UploadedImage, UserConfig};
use crate::forge::{ContentStore, TreeEntry};

/// Result of a batch publish that reached the end of the protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// The new branch head, `None` when no blob was uploaded
    pub commit: Option<String>,
    /// Records created for published items, in input order
    pub uploaded: Vec<UploadedImage>,
    /// Items whose blob upload failed, in input order
    pub failed: Vec<Uuid>,
}

impl BatchReport {
    /// Whether every item was published.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Publish `items` with default options.
pub async fn publish_batch(
    store: &dyn ContentStore,
    sink: &mut dyn StateSink,
    config: &UserConfig,
    items: &mut [UploadItem],
) -> Result<BatchReport, PublishError> {
    publish_batch_with(store, sink, config, items, &PublishOptions::default()).await
}

/// Publish `items` as a single commit on the selected branch.
///
/// # Errors
///
/// Returns the [`PublishError`] of the first structural step that failed.
/// Per-item blob failures are not errors; they end up in
/// [`BatchReport::failed`].
pub async fn publish_batch_with(
    store: &dyn ContentStore,
    sink: &mut dyn StateSink,
    config: &UserConfig,
    items: &mut [UploadItem],
    options: &PublishOptions,
) -> Result<BatchReport, PublishError> {
    let owner = config.owner.as_str();
    let repo = config.selected_repo.as_str();
    let branch = config.selected_branch.as_str();

    log::info!(
        "publishing {} image(s) to {}/{}@{}",
        items.len(),
        owner,
        repo,
        branch
    );

    let results = upload_all(store, items, owner, repo, options.concurrency).await;
    let fold = fold_results(sink, items, results);

    let orphaned = fold.hashes();

    let base = store
        .get_branch(owner, repo, branch)
        .await
        .map_err(|source| PublishError::BranchFetchFailed {
            branch: branch.to_string(),
            orphaned: orphaned.clone(),
            source,
        })?;
    log::debug!(
        "branch {} at {} (tree {})",
        branch,
        base.head_commit_sha,
        base.tree_sha
    );

    if fold.is_empty() {
        log::warn!("no blob was uploaded, leaving {} at {}", branch, base.head_commit_sha);
        return Ok(BatchReport {
            commit: None,
            uploaded: Vec::new(),
            failed: fold.failures,
        });
    }

    let prefix = dir_prefix(&config.selected_dir);
    let entries: Vec<TreeEntry> = fold
        .successes
        .iter()
        .map(|blob| TreeEntry {
            sha: blob.content_hash.clone(),
            path: format!("{}{}", prefix, items[blob.index].filename),
        })
        .collect();

    let tree = store
        .create_tree(owner, repo, &entries, &base)
        .await
        .map_err(|source| PublishError::TreeBuildFailed {
            orphaned: orphaned.clone(),
            source,
        })?;

    let commit = store
        .create_commit(owner, repo, UPLOAD_COMMIT_MESSAGE, &tree, &base)
        .await
        .map_err(|source| PublishError::CommitFailed {
            orphaned: orphaned.clone(),
            source,
        })?;

    store
        .update_ref(owner, repo, branch, &commit.sha)
        .await
        .map_err(|source| PublishError::RefUpdateFailed {
            branch: branch.to_string(),
            orphaned,
            source,
        })?;
    log::info!("branch {} moved to {}", branch, commit.sha);

    let mut uploaded = Vec::with_capacity(fold.successes.len());
    for (blob, entry) in fold.successes.into_iter().zip(entries) {
        let item = &mut items[blob.index];
        // The git-data API does not report sizes; batch records carry 0.
        let file = RemoteFile {
            name: item.filename.clone(),
            content_hash: blob.content_hash,
            path: entry.path,
            size: 0,
        };
        uploaded.push(reconcile(sink, file, item, config));
    }

    Ok(BatchReport {
        commit: Some(commit.sha),
        uploaded,
        failed: fold.failures,
    })
}

/// Split blob results into successes and failures, notifying the sink of each.
fn fold_results(
    sink: &mut dyn StateSink,
    items: &[UploadItem],
    results: Vec<Option<BlobResult>>,
) -> BlobFold {
    let mut fold = BlobFold::default();
    for (item, result) in items.iter().zip(results) {
        match result {
            Some(blob) => {
                sink.apply(StateCommand::MarkUploaded(item.uuid));
                fold.successes.push(blob);
            }
            None => {
                sink.apply(StateCommand::UploadFailed {
                    uuid: item.uuid,
                    filename: item.filename.clone(),
                });
                fold.failures.push(item.uuid);
            }
        }
    }
    fold
}
