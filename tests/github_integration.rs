//! Integration tests for the GitHub content store.
//!
//! GitHubForge is pointed at a local wiremock server, so these tests check
//! the exact requests sent and the mapping of GitHub responses and errors.

use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gitpix::core::types::{BranchSnapshot, ImagePayload, UploadItem, UserConfig};
use gitpix::forge::github::GitHubForge;
use gitpix::forge::{ContentStore, ForgeError, PutFileRequest, TreeEntry, TreeRef};
use gitpix::publish::{publish_batch, publish_one, SessionState, UPLOAD_COMMIT_MESSAGE};

const REPO: &str = "/repos/octocat/pics";

fn forge(server: &MockServer) -> GitHubForge {
    GitHubForge::with_api_base("test-token", server.uri())
}

fn snapshot() -> BranchSnapshot {
    BranchSnapshot {
        tree_sha: "T0".into(),
        head_commit_sha: "C0".into(),
    }
}

fn branch_body(head: &str, tree: &str) -> serde_json::Value {
    json!({
        "name": "main",
        "commit": {
            "sha": head,
            "commit": { "tree": { "sha": tree } }
        }
    })
}

// =============================================================================
// Primitives
// =============================================================================

mod primitives {
    use super::*;

    #[tokio::test]
    async fn get_branch_reads_head_and_tree() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/branches/main", REPO)))
            .and(header("authorization", "Bearer test-token"))
            .and(header("accept", "application/vnd.github+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(branch_body("C0", "T0")))
            .expect(1)
            .mount(&server)
            .await;

        let head = forge(&server)
            .get_branch("octocat", "pics", "main")
            .await
            .unwrap();

        assert_eq!(head, snapshot());
    }

    #[tokio::test]
    async fn create_blob_sends_base64() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}/git/blobs", REPO)))
            .and(body_json(json!({ "content": "aGk=", "encoding": "base64" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "H1" })))
            .expect(1)
            .mount(&server)
            .await;

        let blob = forge(&server)
            .create_blob("octocat", "pics", "aGk=")
            .await
            .unwrap();

        assert_eq!(blob.sha, "H1");
    }

    #[tokio::test]
    async fn create_tree_uses_base_tree_and_blob_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}/git/trees", REPO)))
            .and(body_json(json!({
                "base_tree": "T0",
                "tree": [
                    { "path": "photos/a.png", "mode": "100644", "type": "blob", "sha": "H1" }
                ]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "T1" })))
            .expect(1)
            .mount(&server)
            .await;

        let entries = [TreeEntry {
            sha: "H1".into(),
            path: "photos/a.png".into(),
        }];
        let tree = forge(&server)
            .create_tree("octocat", "pics", &entries, &snapshot())
            .await
            .unwrap();

        assert_eq!(tree.sha, "T1");
    }

    #[tokio::test]
    async fn create_commit_has_single_parent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}/git/commits", REPO)))
            .and(body_json(json!({
                "message": "msg",
                "tree": "T1",
                "parents": ["C0"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "C1" })))
            .expect(1)
            .mount(&server)
            .await;

        let commit = forge(&server)
            .create_commit("octocat", "pics", "msg", &TreeRef { sha: "T1".into() }, &snapshot())
            .await
            .unwrap();

        assert_eq!(commit.sha, "C1");
    }

    #[tokio::test]
    async fn update_ref_is_not_forced_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/git/refs/heads/main", REPO)))
            .and(body_json(json!({ "sha": "C1", "force": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ref": "refs/heads/main",
                "object": { "sha": "C1", "type": "commit" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let updated = forge(&server)
            .update_ref("octocat", "pics", "main", "C1")
            .await
            .unwrap();

        assert_eq!(updated.ref_name, "refs/heads/main");
        assert_eq!(updated.sha, "C1");
    }

    #[tokio::test]
    async fn update_ref_can_be_forced() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/git/refs/heads/main", REPO)))
            .and(body_partial_json(json!({ "force": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ref": "refs/heads/main",
                "object": { "sha": "C1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        forge(&server)
            .force_ref_update(true)
            .update_ref("octocat", "pics", "main", "C1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn put_file_returns_content_descriptor() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/contents/photos/c.png", REPO)))
            .and(body_json(json!({
                "message": "msg",
                "branch": "main",
                "content": "aGk="
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "content": {
                    "name": "c.png",
                    "path": "photos/c.png",
                    "sha": "H9",
                    "size": 2,
                    "type": "file"
                },
                "commit": { "sha": "C1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = PutFileRequest {
            message: "msg".into(),
            branch: "main".into(),
            content: "aGk=".into(),
            committer: None,
        };
        let file = forge(&server)
            .put_file("octocat", "pics", "photos/c.png", &request)
            .await
            .unwrap();

        assert_eq!(file.name, "c.png");
        assert_eq!(file.path, "photos/c.png");
        assert_eq!(file.content_hash, "H9");
        assert_eq!(file.size, 2);
    }

    #[tokio::test]
    async fn put_file_encodes_reserved_characters() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/contents/my%20pics/a%231%3F.png", REPO)))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "content": {
                    "name": "a#1?.png",
                    "path": "my pics/a#1?.png",
                    "sha": "H7",
                    "size": 2
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = PutFileRequest {
            message: "msg".into(),
            branch: "main".into(),
            content: "aGk=".into(),
            committer: None,
        };
        let file = forge(&server)
            .put_file("octocat", "pics", "my pics/a#1?.png", &request)
            .await
            .unwrap();

        assert_eq!(file.path, "my pics/a#1?.png");
        assert_eq!(file.content_hash, "H7");
    }
}

// =============================================================================
// Error mapping
// =============================================================================

mod errors {
    use super::*;

    async fn branch_error(status: u16, message: &str) -> ForgeError {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/branches/main", REPO)))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({ "message": message })),
            )
            .mount(&server)
            .await;

        forge(&server)
            .get_branch("octocat", "pics", "main")
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn status_codes() {
        assert!(matches!(branch_error(401, "Bad credentials").await, ForgeError::AuthFailed(_)));
        assert!(matches!(
            branch_error(403, "Resource not accessible").await,
            ForgeError::AuthFailed(_)
        ));
        assert_eq!(
            branch_error(403, "API rate limit exceeded").await,
            ForgeError::RateLimited
        );
        assert_eq!(
            branch_error(404, "Branch not found").await,
            ForgeError::NotFound("Branch not found".into())
        );
        assert_eq!(branch_error(429, "slow down").await, ForgeError::RateLimited);
        assert!(matches!(
            branch_error(502, "Bad gateway").await,
            ForgeError::ApiError { status: 502, .. }
        ));
    }

    #[tokio::test]
    async fn non_fast_forward_is_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/git/refs/heads/main", REPO)))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({ "message": "Update is not a fast forward" })),
            )
            .mount(&server)
            .await;

        let err = forge(&server)
            .update_ref("octocat", "pics", "main", "C1")
            .await
            .unwrap_err();

        assert_eq!(err, ForgeError::Conflict("Update is not a fast forward".into()));
    }

    #[tokio::test]
    async fn other_validation_errors_stay_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}/git/trees", REPO)))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({ "message": "tree.sha is invalid" })),
            )
            .mount(&server)
            .await;

        let err = forge(&server)
            .create_tree("octocat", "pics", &[], &snapshot())
            .await
            .unwrap_err();

        assert!(matches!(err, ForgeError::ApiError { status: 422, .. }));
    }

    #[tokio::test]
    async fn missing_token_fails_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = GitHubForge::with_api_base("", server.uri())
            .get_branch("octocat", "pics", "main")
            .await
            .unwrap_err();

        assert_eq!(err, ForgeError::AuthRequired);
    }
}

// =============================================================================
// Publishing through GitHub
// =============================================================================

mod publishing {
    use super::*;

    async fn mount_json(
        server: &MockServer,
        verb: &str,
        route: &str,
        status: u16,
        body: serde_json::Value,
    ) {
        Mock::given(method(verb))
            .and(path(format!("{}/{}", REPO, route)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn batch_of_two_lands_as_one_commit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}/git/blobs", REPO)))
            .and(body_partial_json(json!({ "content": "YQ==" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "H1" })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{}/git/blobs", REPO)))
            .and(body_partial_json(json!({ "content": "Yg==" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "H2" })))
            .mount(&server)
            .await;
        mount_json(&server, "GET", "branches/main", 200, branch_body("C0", "T0")).await;
        Mock::given(method("POST"))
            .and(path(format!("{}/git/trees", REPO)))
            .and(body_json(json!({
                "base_tree": "T0",
                "tree": [
                    { "path": "photos/a.png", "mode": "100644", "type": "blob", "sha": "H1" },
                    { "path": "photos/b.png", "mode": "100644", "type": "blob", "sha": "H2" }
                ]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "T1" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{}/git/commits", REPO)))
            .and(body_json(json!({
                "message": UPLOAD_COMMIT_MESSAGE,
                "tree": "T1",
                "parents": ["C0"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "C1" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/git/refs/heads/main", REPO)))
            .and(body_json(json!({ "sha": "C1", "force": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ref": "refs/heads/main",
                "object": { "sha": "C1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = UserConfig::new("octocat", "pics", "main", "/photos");
        let mut items = vec![
            UploadItem::new("a.png", ImagePayload::Bytes(b"a".to_vec())),
            UploadItem::new("b.png", ImagePayload::Bytes(b"b".to_vec())),
        ];
        let mut state = SessionState::new();

        let report = publish_batch(&forge(&server), &mut state, &config, &mut items)
            .await
            .unwrap();

        assert_eq!(report.commit.as_deref(), Some("C1"));
        let hashes: Vec<_> = report.uploaded.iter().map(|i| i.content_hash.as_str()).collect();
        assert_eq!(hashes, ["H1", "H2"]);
        assert!(report.uploaded.iter().all(|i| i.size == 0 && i.dir == "photos"));
        assert_eq!(state.images_in("photos").len(), 2);
    }

    #[tokio::test]
    async fn moved_branch_fails_the_batch() {
        let server = MockServer::start().await;
        mount_json(&server, "POST", "git/blobs", 201, json!({ "sha": "H1" })).await;
        mount_json(&server, "GET", "branches/main", 200, branch_body("C0", "T0")).await;
        mount_json(&server, "POST", "git/trees", 201, json!({ "sha": "T1" })).await;
        mount_json(&server, "POST", "git/commits", 201, json!({ "sha": "C1" })).await;
        mount_json(
            &server,
            "PATCH",
            "git/refs/heads/main",
            422,
            json!({ "message": "Update is not a fast forward" }),
        )
        .await;

        let config = UserConfig::new("octocat", "pics", "main", "/");
        let mut items = vec![UploadItem::new("a.png", ImagePayload::Bytes(b"a".to_vec()))];
        let mut state = SessionState::new();

        let err = publish_batch(&forge(&server), &mut state, &config, &mut items)
            .await
            .unwrap_err();

        assert!(err.is_branch_moved());
        assert_eq!(err.orphaned_blobs(), ["H1"]);
        assert!(state.uploaded.is_empty());
        assert!(items[0].uploaded.is_none());
    }

    #[tokio::test]
    async fn single_upload_with_committer() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/contents/c.png", REPO)))
            .and(body_json(json!({
                "message": UPLOAD_COMMIT_MESSAGE,
                "branch": "main",
                "content": "aGk=",
                "committer": { "name": "octocat", "email": "cat@example.com" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "content": { "name": "c.png", "path": "c.png", "sha": "H9", "size": 2 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = UserConfig::new("octocat", "pics", "main", "/").with_email("cat@example.com");
        let mut item = UploadItem::new("c.png", ImagePayload::Bytes(b"hi".to_vec()));
        let mut state = SessionState::new();

        assert!(publish_one(&forge(&server), &mut state, &config, &mut item).await);

        let image = item.uploaded.unwrap();
        assert_eq!(image.dir, "/");
        assert_eq!(image.path, "c.png");
        assert_eq!(image.size, 2);
        assert_eq!(state.uploaded_count, 1);
    }

    #[tokio::test]
    async fn single_upload_failure_is_false() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "PUT",
            "contents/c.png",
            409,
            json!({ "message": "sha mismatch" }),
        )
        .await;

        let config = UserConfig::new("octocat", "pics", "main", "/");
        let mut item = UploadItem::new("c.png", ImagePayload::Bytes(b"hi".to_vec()));
        let mut state = SessionState::new();

        assert!(!publish_one(&forge(&server), &mut state, &config, &mut item).await);
        assert!(state.uploaded.is_empty());
    }
}
