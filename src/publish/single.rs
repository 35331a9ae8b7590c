//! publish::single
//!
//! Fast path for one image: a single "put file contents" call, which creates
//! the blob, tree, commit and ref update server side.

use super::reconcile::reconcile;
use super::state::{StateCommand, StateSink};
use super::UPLOAD_COMMIT_MESSAGE;
use crate::core::paths::{contents_endpoint, resolve_path};
use crate::core::types::{UploadItem, UserConfig};
use crate::forge::{Committer, ContentStore, PutFileRequest};

/// Contents payload for `item`.
///
/// A committer is only attached when the config carries an email; the
/// committer name is the repository owner.
pub fn put_file_request(config: &UserConfig, item: &UploadItem) -> PutFileRequest {
    PutFileRequest {
        message: UPLOAD_COMMIT_MESSAGE.to_string(),
        branch: config.selected_branch.clone(),
        content: item.payload.to_base64(),
        committer: config.email.as_ref().map(|email| Committer {
            name: config.owner.clone(),
            email: email.clone(),
        }),
    }
}

/// Publish one image.
///
/// Returns `true` once the image is published and reconciled, `false` if
/// the remote call failed. Failures are logged, never raised.
pub async fn publish_one(
    store: &dyn ContentStore,
    sink: &mut dyn StateSink,
    config: &UserConfig,
    item: &mut UploadItem,
) -> bool {
    let path = resolve_path(config, item);
    let request = put_file_request(config, item);

    log::info!(
        "publishing {} to {}/{}@{}",
        path,
        config.owner,
        config.selected_repo,
        config.selected_branch
    );
    log::debug!("PUT {}", contents_endpoint(config, item));

    item.upload_status.uploading = true;
    let result = store
        .put_file(&config.owner, &config.selected_repo, &path, &request)
        .await;
    item.upload_status.uploading = false;

    match result {
        Ok(file) => {
            reconcile(sink, file, item, config);
            sink.apply(StateCommand::MarkUploaded(item.uuid));
            true
        }
        Err(e) => {
            log::warn!("upload of {} failed: {}", path, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ImagePayload;
    use crate::forge::mock::{FailOn, MockForge};
    use crate::forge::ForgeError;

    #[test]
    fn request_without_email_has_no_committer() {
        let config = UserConfig::new("octocat", "pics", "main", "/");
        let item = UploadItem::new("c.png", ImagePayload::Bytes(b"hi".to_vec()));

        let request = put_file_request(&config, &item);

        assert_eq!(request.message, UPLOAD_COMMIT_MESSAGE);
        assert_eq!(request.branch, "main");
        assert_eq!(request.content, "aGk=");
        assert!(request.committer.is_none());
    }

    #[test]
    fn request_with_email_names_owner() {
        let config =
            UserConfig::new("octocat", "pics", "main", "/").with_email("cat@example.com");
        let item = UploadItem::new("c.png", ImagePayload::Bytes(b"hi".to_vec()));

        let committer = put_file_request(&config, &item).committer.unwrap();

        assert_eq!(committer.name, "octocat");
        assert_eq!(committer.email, "cat@example.com");
    }

    #[tokio::test]
    async fn failure_returns_false_without_state() {
        let forge = MockForge::new()
            .with_branch("main", "c0", "t0")
            .fail_on(FailOn::PutFile(ForgeError::AuthFailed("bad token".into())));
        let config = UserConfig::new("o", "r", "main", "/");
        let mut item = UploadItem::new("c.png", ImagePayload::Bytes(vec![1]));
        let mut sink: Vec<StateCommand> = Vec::new();

        assert!(!publish_one(&forge, &mut sink, &config, &mut item).await);
        assert!(sink.is_empty());
        assert!(item.uploaded.is_none());
        assert!(!item.upload_status.uploading);
    }
}
