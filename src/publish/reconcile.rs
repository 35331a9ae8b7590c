//! publish::reconcile
//!
//! Post-success handler shared by both publishers.
//!
//! Once the remote store has accepted an image, the local side must follow:
//! the item is marked complete, an [`UploadedImage`] is attached to it, and
//! the state sink learns about the directory and the image. This step has no
//! failure modes and is never skipped after a remote success.

use super::state::{StateCommand, StateSink};
use crate::core::types::{
    RemoteFile, UploadItem, UploadStatus, UploadedImage, UserConfig, IMAGE_KIND,
};

/// Record a published image locally.
///
/// Commands are emitted directory-set first, then the per-directory index,
/// then the flat uploaded list, so observers of the list can assume the
/// directory already exists.
pub fn reconcile(
    sink: &mut dyn StateSink,
    file: RemoteFile,
    item: &mut UploadItem,
    config: &UserConfig,
) -> UploadedImage {
    let dir = match item.active_re_upload() {
        Some(info) => info.dir.clone(),
        None => config.selected_dir.clone(),
    };

    item.upload_status = UploadStatus {
        uploading: false,
        progress: 100,
    };

    let image = UploadedImage {
        uuid: item.uuid,
        kind: IMAGE_KIND.to_string(),
        dir: dir.clone(),
        name: file.name,
        content_hash: file.content_hash,
        path: file.path,
        size: file.size,
        checked: false,
        deleting: false,
    };
    item.uploaded = Some(image.clone());

    log::debug!("reconciled {} into '{}'", image.path, dir);
    sink.apply(StateCommand::AddDirectory(dir));
    sink.apply(StateCommand::AddImageToDirectory(image.clone()));
    sink.apply(StateCommand::AddUploaded(image.clone()));

    image
}
