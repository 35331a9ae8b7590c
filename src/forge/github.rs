//! forge::github
//!
//! GitHub content store implementation using the REST git-data and
//! contents APIs.
//!
//! # Endpoints
//!
//! | Primitive       | Endpoint                                   |
//! |-----------------|--------------------------------------------|
//! | `get_branch`    | `GET /repos/{o}/{r}/branches/{branch}`     |
//! | `create_blob`   | `POST /repos/{o}/{r}/git/blobs`            |
//! | `create_tree`   | `POST /repos/{o}/{r}/git/trees`            |
//! | `create_commit` | `POST /repos/{o}/{r}/git/commits`          |
//! | `update_ref`    | `PATCH /repos/{o}/{r}/git/refs/heads/{b}`  |
//! | `put_file`      | `PUT /repos/{o}/{r}/contents/{path}`       |
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation:
//! - Returns `ForgeError::RateLimited` when limits are hit
//! - Does not implement automatic retry (caller's responsibility)
//!
//! # Example
//!
//! ```ignore
//! use gitpix::forge::github::GitHubForge;
//! use gitpix::forge::ContentStore;
//!
//! let forge = GitHubForge::new("ghp_xxx");
//! let head = forge.get_branch("octocat", "pics", "main").await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{
    BlobRef, CommitRef, ContentStore, ForgeError, PutFileRequest, RefUpdate, TreeEntry, TreeRef,
};
use crate::core::types::{BranchSnapshot, RemoteFile};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "gitpix";

/// File mode for regular (non-executable) blobs in a tree.
const BLOB_MODE: &str = "100644";

/// GitHub content store.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Personal access token or app token
    token: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
    /// Force ref updates even when they are not fast-forwards
    force_ref_update: bool,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("has_token", &!self.token.is_empty())
            .field("api_base", &self.api_base)
            .field("force_ref_update", &self.force_ref_update)
            .finish()
    }
}

impl GitHubForge {
    /// Create a GitHub store against api.github.com.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a GitHub store with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (e.g., `https://github.example.com/api/v3`)
    /// and for tests against a local mock server.
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            client: Client::new(),
            token: token.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
            force_ref_update: false,
        }
    }

    /// Force branch ref updates.
    ///
    /// When `false` (the default), a branch that moved since the snapshot was
    /// taken makes `update_ref` fail with `ForgeError::Conflict`.
    pub fn force_ref_update(mut self, force: bool) -> Self {
        self.force_ref_update = force;
        self
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        if self.token.is_empty() {
            return Err(ForgeError::AuthRequired);
        }
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, owner: &str, repo: &str, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            path
        )
    }

    /// Send a request with an optional JSON body and decode the response.
    async fn execute<B, T>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, ForgeError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        log::debug!("{} {}", method, url);
        let mut request = self
            .client
            .request(method, url)
            .headers(self.headers()?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Err(self.error_from_response(response, status).await)
        }
    }

    /// Map an error response from the API.
    async fn error_from_response(&self, response: Response, status: StatusCode) -> ForgeError {
        // Extract permission headers before consuming response body.
        let required_permissions = response
            .headers()
            .get("X-Accepted-GitHub-Permissions")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if message.to_lowercase().contains("rate limit") => {
                ForgeError::RateLimited
            }
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);
                if let Some(perms) = required_permissions.filter(|p| !p.is_empty()) {
                    err_msg.push_str(&format!(" [required: {}]", perms));
                }
                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::CONFLICT => ForgeError::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY if is_fast_forward_rejection(&message) => {
                ForgeError::Conflict(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// GitHub reports a moved branch on ref update as a 422 with this wording.
fn is_fast_forward_rejection(message: &str) -> bool {
    message.to_lowercase().contains("fast forward")
}

#[async_trait]
impl ContentStore for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<BranchSnapshot, ForgeError> {
        let url = self.repo_url(owner, repo, &format!("branches/{}", encode_path(branch)));
        let branch: GitHubBranch = self.execute::<(), _>(Method::GET, &url, None).await?;
        Ok(branch.into())
    }

    async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content: &str,
    ) -> Result<BlobRef, ForgeError> {
        let url = self.repo_url(owner, repo, "git/blobs");
        let body = CreateBlobBody {
            content,
            encoding: "base64",
        };
        let created: GitHubSha = self.execute(Method::POST, &url, Some(&body)).await?;
        Ok(BlobRef { sha: created.sha })
    }

    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        entries: &[TreeEntry],
        base: &BranchSnapshot,
    ) -> Result<TreeRef, ForgeError> {
        let url = self.repo_url(owner, repo, "git/trees");
        let body = CreateTreeBody {
            base_tree: &base.tree_sha,
            tree: entries
                .iter()
                .map(|entry| TreeEntryBody {
                    path: &entry.path,
                    mode: BLOB_MODE,
                    kind: "blob",
                    sha: &entry.sha,
                })
                .collect(),
        };
        let created: GitHubSha = self.execute(Method::POST, &url, Some(&body)).await?;
        Ok(TreeRef { sha: created.sha })
    }

    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        message: &str,
        tree: &TreeRef,
        base: &BranchSnapshot,
    ) -> Result<CommitRef, ForgeError> {
        let url = self.repo_url(owner, repo, "git/commits");
        let body = CreateCommitBody {
            message,
            tree: &tree.sha,
            parents: vec![&base.head_commit_sha],
        };
        let created: GitHubSha = self.execute(Method::POST, &url, Some(&body)).await?;
        Ok(CommitRef { sha: created.sha })
    }

    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        commit_sha: &str,
    ) -> Result<RefUpdate, ForgeError> {
        let url = self.repo_url(owner, repo, &format!("git/refs/heads/{}", encode_path(branch)));
        let body = UpdateRefBody {
            sha: commit_sha,
            force: self.force_ref_update,
        };
        let updated: GitHubRef = self.execute(Method::PATCH, &url, Some(&body)).await?;
        Ok(RefUpdate {
            ref_name: updated.ref_name,
            sha: updated.object.sha,
        })
    }

    async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &PutFileRequest,
    ) -> Result<RemoteFile, ForgeError> {
        let url = self.repo_url(owner, repo, &format!("contents/{}", encode_path(path)));
        let created: GitHubContentResponse = self.execute(Method::PUT, &url, Some(request)).await?;
        Ok(created.content)
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a blob.
#[derive(Serialize)]
struct CreateBlobBody<'a> {
    content: &'a str,
    encoding: &'a str,
}

/// Request body for creating a tree.
#[derive(Serialize)]
struct CreateTreeBody<'a> {
    base_tree: &'a str,
    tree: Vec<TreeEntryBody<'a>>,
}

/// One entry of a tree creation request.
#[derive(Serialize)]
struct TreeEntryBody<'a> {
    path: &'a str,
    mode: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    sha: &'a str,
}

/// Request body for creating a commit.
#[derive(Serialize)]
struct CreateCommitBody<'a> {
    message: &'a str,
    tree: &'a str,
    parents: Vec<&'a str>,
}

/// Request body for updating a ref.
#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
    force: bool,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Any response whose only interesting field is `sha`.
#[derive(Deserialize)]
struct GitHubSha {
    sha: String,
}

/// `GET /branches/{branch}` response (subset).
#[derive(Deserialize)]
struct GitHubBranch {
    commit: GitHubBranchCommit,
}

#[derive(Deserialize)]
struct GitHubBranchCommit {
    sha: String,
    commit: GitHubCommitDetail,
}

#[derive(Deserialize)]
struct GitHubCommitDetail {
    tree: GitHubSha,
}

impl From<GitHubBranch> for BranchSnapshot {
    fn from(branch: GitHubBranch) -> Self {
        BranchSnapshot {
            tree_sha: branch.commit.commit.tree.sha,
            head_commit_sha: branch.commit.sha,
        }
    }
}

/// `PATCH /git/refs/...` response.
#[derive(Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GitHubSha,
}

/// `PUT /contents/{path}` response (subset).
#[derive(Deserialize)]
struct GitHubContentResponse {
    content: RemoteFile,
}

// --------------------------------------------------------------------------
// URL Parsing
// --------------------------------------------------------------------------

/// Percent-encode each `/`-separated segment of a repository path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse a GitHub remote URL to extract owner and repo.
///
/// Supports both SSH and HTTPS formats:
/// - `git@github.com:owner/repo.git`
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
///
/// # Example
///
/// ```
/// use gitpix::forge::github::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:octocat/hello-world.git").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))?;

    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
