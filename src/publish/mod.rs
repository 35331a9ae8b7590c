//! publish
//!
//! Orchestrates image publishing on top of a [`ContentStore`].
//!
//! # Architecture
//!
//! Two entry points share one reconciliation step:
//!
//! - [`batch`]: N images, blob per image, then one tree, one commit and one
//!   ref update. Structural failures are [`PublishError`]s.
//! - [`single`]: one image through the contents API. Reports a `bool`.
//!
//! Both write local state only through a caller supplied [`StateSink`], and
//! only after the remote side has accepted the change.
//!
//! # Example
//!
//! ```
//! use gitpix::core::types::{ImagePayload, UploadItem, UserConfig};
//! use gitpix::forge::mock::MockForge;
//! use gitpix::publish::{publish_batch, SessionState};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new().with_branch("main", "c0", "t0");
//! let config = UserConfig::new("octocat", "pics", "main", "photos");
//! let mut items = vec![UploadItem::new("a.png", ImagePayload::Bytes(vec![1]))];
//! let mut state = SessionState::new();
//!
//! let report = publish_batch(&forge, &mut state, &config, &mut items).await.unwrap();
//! assert_eq!(report.uploaded[0].path, "photos/a.png");
//! assert!(state.dirs.contains("photos"));
//! # });
//! ```

pub mod batch;
pub mod blob;
mod errors;
pub mod reconcile;
pub mod single;
pub mod state;

pub use batch::{publish_batch, publish_batch_with, BatchReport};
pub use blob::{upload_blob, BlobFold};
pub use errors::PublishError;
pub use reconcile::reconcile;
pub use single::publish_one;
pub use state::{SessionState, StateCommand, StateSink};

use crate::core::types::{UploadItem, UserConfig};
use crate::forge::ContentStore;

/// Commit message of every publish.
pub const UPLOAD_COMMIT_MESSAGE: &str = "Upload images via gitpix";

/// Tuning knobs for a batch publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Maximum blob uploads in flight
    pub concurrency: usize,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// A store bound to a target, for callers that publish repeatedly.
pub struct Publisher<'a> {
    store: &'a dyn ContentStore,
    config: UserConfig,
    options: PublishOptions,
}

impl<'a> Publisher<'a> {
    pub fn new(store: &'a dyn ContentStore, config: UserConfig) -> Self {
        Self {
            store,
            config,
            options: PublishOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PublishOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &UserConfig {
        &self.config
    }

    /// Publish `items` as one commit.
    pub async fn publish(
        &self,
        sink: &mut dyn StateSink,
        items: &mut [UploadItem],
    ) -> Result<BatchReport, PublishError> {
        publish_batch_with(self.store, sink, &self.config, items, &self.options).await
    }

    /// Publish a single item through the contents API.
    pub async fn publish_single(&self, sink: &mut dyn StateSink, item: &mut UploadItem) -> bool {
        publish_one(self.store, sink, &self.config, item).await
    }
}
