//! publish::blob
//!
//! Per-item blob upload, the failure-tolerant first phase of a batch publish.
//!
//! # Design
//!
//! A failed blob upload is never an error here: it is an `Option::None` that
//! the batch folds into [`BlobFold::failures`]. Blobs are content addressed,
//! so an uploaded blob that never gets referenced is harmless.
//!
//! Uploads may run concurrently. `buffered` yields results in input order
//! whatever the completion order, which keeps tree entries in input order.

use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::core::types::{BlobResult, UploadItem};
use crate::forge::ContentStore;

/// Upload one item's content as a blob.
///
/// `item.upload_status.uploading` is `true` only while the call is in
/// flight, whatever the outcome.
pub async fn upload_blob(
    store: &dyn ContentStore,
    index: usize,
    item: &mut UploadItem,
    owner: &str,
    repo: &str,
) -> Option<BlobResult> {
    item.upload_status.uploading = true;
    let result = store
        .create_blob(owner, repo, &item.payload.to_base64())
        .await;
    item.upload_status.uploading = false;

    match result {
        Ok(blob) => {
            log::debug!("uploaded blob {} for {}", blob.sha, item.filename);
            Some(BlobResult {
                index,
                uuid: item.uuid,
                content_hash: blob.sha,
            })
        }
        Err(e) => {
            log::warn!("blob upload failed for {}: {}", item.filename, e);
            None
        }
    }
}

/// Outcome of the blob phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobFold {
    /// Uploaded blobs, in input order
    pub successes: Vec<BlobResult>,
    /// Items whose upload failed, in input order
    pub failures: Vec<Uuid>,
}

impl BlobFold {
    /// Whether no blob was uploaded.
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty()
    }

    /// Content hashes of every uploaded blob.
    pub fn hashes(&self) -> Vec<String> {
        self.successes
            .iter()
            .map(|blob| blob.content_hash.clone())
            .collect()
    }
}

/// Upload every item, at most `concurrency` at a time.
///
/// Returns one entry per item, aligned with `items`.
pub async fn upload_all(
    store: &dyn ContentStore,
    items: &mut [UploadItem],
    owner: &str,
    repo: &str,
    concurrency: usize,
) -> Vec<Option<BlobResult>> {
    stream::iter(items.iter_mut().enumerate())
        .map(|(index, item)| upload_blob(store, index, item, owner, repo))
        .buffered(concurrency.max(1))
        .collect()
        .await
}
