//! publish::state
//!
//! The application-state interface publishers write to.
//!
//! # Design
//!
//! Publishers never own application state. They emit [`StateCommand`]s into
//! a [`StateSink`] supplied by the caller, so the same publish code drives a
//! UI store, a CLI session, or a test recorder.
//!
//! [`SessionState`] is the in-memory sink used by the CLI.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::core::types::UploadedImage;

/// A named mutation of application state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateCommand {
    /// Add a directory to the directory set.
    AddDirectory(String),
    /// Add an image to its directory's image index.
    AddImageToDirectory(UploadedImage),
    /// Append an image to the flat uploaded list.
    AddUploaded(UploadedImage),
    /// One more item finished uploading its content.
    MarkUploaded(Uuid),
    /// An item's blob upload failed; shown to the user by filename.
    UploadFailed { uuid: Uuid, filename: String },
}

/// Receiver of state commands.
pub trait StateSink {
    fn apply(&mut self, command: StateCommand);
}

/// Records commands in emission order.
impl StateSink for Vec<StateCommand> {
    fn apply(&mut self, command: StateCommand) {
        self.push(command);
    }
}

/// In-memory application state for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Every image published this session, in publish order
    pub uploaded: Vec<UploadedImage>,
    /// Directory to the images published into it
    pub dir_images: BTreeMap<String, Vec<UploadedImage>>,
    /// Directories known to contain images
    pub dirs: BTreeSet<String>,
    /// Items whose content reached the remote store
    pub uploaded_count: usize,
    /// Filenames of items that failed to upload
    pub failed: Vec<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images published into `dir`.
    pub fn images_in(&self, dir: &str) -> &[UploadedImage] {
        self.dir_images.get(dir).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl StateSink for SessionState {
    fn apply(&mut self, command: StateCommand) {
        match command {
            StateCommand::AddDirectory(dir) => {
                self.dir_images.entry(dir.clone()).or_default();
                self.dirs.insert(dir);
            }
            StateCommand::AddImageToDirectory(image) => {
                let images = self.dir_images.entry(image.dir.clone()).or_default();
                images.retain(|existing| existing.path != image.path);
                images.push(image);
            }
            StateCommand::AddUploaded(image) => {
                self.uploaded.retain(|existing| existing.path != image.path);
                self.uploaded.push(image);
            }
            StateCommand::MarkUploaded(_) => self.uploaded_count += 1,
            StateCommand::UploadFailed { filename, .. } => self.failed.push(filename),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IMAGE_KIND;

    fn image(dir: &str, path: &str) -> UploadedImage {
        UploadedImage {
            uuid: Uuid::new_v4(),
            kind: IMAGE_KIND.into(),
            dir: dir.into(),
            name: path.rsplit('/').next().unwrap().into(),
            content_hash: "h".into(),
            path: path.into(),
            size: 0,
            checked: false,
            deleting: false,
        }
    }

    #[test]
    fn session_tracks_dirs_and_images() {
        let mut state = SessionState::new();
        let img = image("photos", "photos/a.png");

        state.apply(StateCommand::AddDirectory("photos".into()));
        state.apply(StateCommand::AddImageToDirectory(img.clone()));
        state.apply(StateCommand::AddUploaded(img.clone()));
        state.apply(StateCommand::MarkUploaded(img.uuid));

        assert!(state.dirs.contains("photos"));
        assert_eq!(state.images_in("photos"), &[img.clone()]);
        assert_eq!(state.uploaded, vec![img]);
        assert_eq!(state.uploaded_count, 1);
        assert!(state.images_in("other").is_empty());
    }

    #[test]
    fn re_upload_replaces_record_at_same_path() {
        let mut state = SessionState::new();
        let first = image("photos", "photos/a.png");
        let second = image("photos", "photos/a.png");

        for img in [&first, &second] {
            state.apply(StateCommand::AddImageToDirectory(img.clone()));
            state.apply(StateCommand::AddUploaded(img.clone()));
        }

        assert_eq!(state.uploaded.len(), 1);
        assert_eq!(state.uploaded[0].uuid, second.uuid);
        assert_eq!(state.images_in("photos").len(), 1);
    }

    #[test]
    fn failures_are_listed() {
        let mut state = SessionState::new();
        state.apply(StateCommand::UploadFailed {
            uuid: Uuid::new_v4(),
            filename: "b.png".into(),
        });
        assert_eq!(state.failed, vec!["b.png".to_string()]);
        assert_eq!(state.uploaded_count, 0);
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut recorded: Vec<StateCommand> = Vec::new();
        recorded.apply(StateCommand::AddDirectory("/".into()));
        recorded.apply(StateCommand::MarkUploaded(Uuid::nil()));
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0], StateCommand::AddDirectory("/".into()));
    }
}
