//! forge::mock
//!
//! Mock content store for deterministic testing.
//!
//! # Design
//!
//! The mock keeps branches, blobs, trees and commits in memory, records every
//! call, and can be told to fail a specific primitive. Hashes are
//! predictable: the n-th blob is `blob-n`, the n-th tree `tree-n`, the n-th
//! commit `commit-n`.
//!
//! # Example
//!
//! ```
//! use gitpix::forge::mock::MockForge;
//! use gitpix::forge::ContentStore;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new().with_branch("main", "c0", "t0");
//!
//! let blob = forge.create_blob("octocat", "pics", "aGk=").await.unwrap();
//! assert_eq!(blob.sha, "blob-1");
//!
//! let head = forge.get_branch("octocat", "pics", "main").await.unwrap();
//! assert_eq!(head.head_commit_sha, "c0");
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{
    BlobRef, CommitRef, ContentStore, ForgeError, PutFileRequest, RefUpdate, TreeEntry, TreeRef,
};
use crate::core::types::{BranchSnapshot, ImagePayload, RemoteFile};

/// Mock content store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockForgeInner {
    /// Branch name to head commit.
    branches: HashMap<String, String>,
    /// Commit sha to (tree sha, parent sha).
    commits: HashMap<String, (String, Option<String>)>,
    /// Tree sha to its path to blob entries.
    trees: HashMap<String, Vec<TreeEntry>>,
    /// Blob sha to base64 content.
    blobs: HashMap<String, String>,
    /// Per-kind counters for generated hashes.
    sequences: HashMap<&'static str, u64>,
    /// Primitive to fail (for testing error paths).
    fail_on: Option<FailOn>,
    /// Blob contents that are rejected.
    rejected_blobs: HashSet<String>,
    /// Accept non-fast-forward ref updates.
    force_ref_update: bool,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which primitive should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    GetBranch(ForgeError),
    CreateBlob(ForgeError),
    CreateTree(ForgeError),
    CreateCommit(ForgeError),
    UpdateRef(ForgeError),
    PutFile(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetBranch {
        branch: String,
    },
    CreateBlob {
        content: String,
    },
    CreateTree {
        base_tree: String,
        entries: Vec<TreeEntry>,
    },
    CreateCommit {
        message: String,
        tree: String,
        parent: String,
    },
    UpdateRef {
        branch: String,
        sha: String,
    },
    PutFile {
        path: String,
        request: PutFileRequest,
    },
}

impl MockForge {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner::default())),
        }
    }

    /// Seed a branch whose head is `head` with root tree `tree`.
    pub fn with_branch(self, branch: &str, head: &str, tree: &str) -> Self {
        {
            let mut inner = self.lock();
            inner.branches.insert(branch.to_string(), head.to_string());
            inner
                .commits
                .insert(head.to_string(), (tree.to_string(), None));
            inner.trees.entry(tree.to_string()).or_default();
        }
        self
    }

    /// Configure the mock to fail on a specific primitive.
    ///
    /// # Example
    ///
    /// ```
    /// use gitpix::forge::mock::{FailOn, MockForge};
    /// use gitpix::forge::ForgeError;
    ///
    /// let forge = MockForge::new().fail_on(FailOn::CreateTree(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Reject blob uploads of exactly this payload.
    pub fn reject_blob(self, payload: &ImagePayload) -> Self {
        self.lock().rejected_blobs.insert(payload.to_base64());
        self
    }

    /// Accept non-fast-forward ref updates.
    pub fn force_ref_update(self, force: bool) -> Self {
        self.lock().force_ref_update = force;
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Move a branch behind the publisher's back.
    pub fn advance_branch(&self, branch: &str, sha: &str) {
        let mut inner = self.lock();
        let tree = inner
            .branches
            .get(branch)
            .and_then(|head| inner.commits.get(head))
            .map(|(tree, _)| tree.clone())
            .unwrap_or_default();
        let parent = inner.branches.get(branch).cloned();
        inner.commits.insert(sha.to_string(), (tree, parent));
        inner.branches.insert(branch.to_string(), sha.to_string());
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Current head of a branch.
    pub fn branch_head(&self, branch: &str) -> Option<String> {
        self.lock().branches.get(branch).cloned()
    }

    /// Entries of a tree created through this mock.
    pub fn tree_entries(&self, tree: &str) -> Option<Vec<TreeEntry>> {
        self.lock().trees.get(tree).cloned()
    }

    /// Tree and parent of a commit.
    pub fn commit(&self, sha: &str) -> Option<(String, Option<String>)> {
        self.lock().commits.get(sha).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MockForgeInner> {
        // A poisoned lock only happens after a panicking test thread.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Result<(), ForgeError> {
        let inner = self.lock();
        match &inner.fail_on {
            Some(FailOn::GetBranch(e)) if expected == "get_branch" => Err(e.clone()),
            Some(FailOn::CreateBlob(e)) if expected == "create_blob" => Err(e.clone()),
            Some(FailOn::CreateTree(e)) if expected == "create_tree" => Err(e.clone()),
            Some(FailOn::CreateCommit(e)) if expected == "create_commit" => Err(e.clone()),
            Some(FailOn::UpdateRef(e)) if expected == "update_ref" => Err(e.clone()),
            Some(FailOn::PutFile(e)) if expected == "put_file" => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

impl MockForgeInner {
    /// Next predictable hash of the given kind, e.g. `blob-3`.
    fn next_sha(&mut self, kind: &'static str) -> String {
        let seq = self.sequences.entry(kind).or_insert(0);
        *seq += 1;
        format!("{}-{}", kind, seq)
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_branch(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
    ) -> Result<BranchSnapshot, ForgeError> {
        self.record(MockOperation::GetBranch {
            branch: branch.to_string(),
        });
        self.check_fail("get_branch")?;

        let inner = self.lock();
        let head = inner
            .branches
            .get(branch)
            .ok_or_else(|| ForgeError::NotFound(format!("Branch not found: {}", branch)))?;
        let (tree, _) = inner
            .commits
            .get(head)
            .ok_or_else(|| ForgeError::NotFound(format!("Commit not found: {}", head)))?;

        Ok(BranchSnapshot {
            tree_sha: tree.clone(),
            head_commit_sha: head.clone(),
        })
    }

    async fn create_blob(
        &self,
        _owner: &str,
        _repo: &str,
        content: &str,
    ) -> Result<BlobRef, ForgeError> {
        self.record(MockOperation::CreateBlob {
            content: content.to_string(),
        });
        self.check_fail("create_blob")?;

        let mut inner = self.lock();
        if inner.rejected_blobs.contains(content) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "blob rejected".into(),
            });
        }

        let sha = inner.next_sha("blob");
        inner.blobs.insert(sha.clone(), content.to_string());
        Ok(BlobRef { sha })
    }

    async fn create_tree(
        &self,
        _owner: &str,
        _repo: &str,
        entries: &[TreeEntry],
        base: &BranchSnapshot,
    ) -> Result<TreeRef, ForgeError> {
        self.record(MockOperation::CreateTree {
            base_tree: base.tree_sha.clone(),
            entries: entries.to_vec(),
        });
        self.check_fail("create_tree")?;

        let mut inner = self.lock();
        if let Some(missing) = entries.iter().find(|e| !inner.blobs.contains_key(&e.sha)) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: format!("unknown blob {}", missing.sha),
            });
        }

        let mut merged = inner.trees.get(&base.tree_sha).cloned().unwrap_or_default();
        for entry in entries {
            merged.retain(|e| e.path != entry.path);
            merged.push(entry.clone());
        }

        let sha = inner.next_sha("tree");
        inner.trees.insert(sha.clone(), merged);
        Ok(TreeRef { sha })
    }

    async fn create_commit(
        &self,
        _owner: &str,
        _repo: &str,
        message: &str,
        tree: &TreeRef,
        base: &BranchSnapshot,
    ) -> Result<CommitRef, ForgeError> {
        self.record(MockOperation::CreateCommit {
            message: message.to_string(),
            tree: tree.sha.clone(),
            parent: base.head_commit_sha.clone(),
        });
        self.check_fail("create_commit")?;

        let mut inner = self.lock();
        let sha = inner.next_sha("commit");
        inner.commits.insert(
            sha.clone(),
            (tree.sha.clone(), Some(base.head_commit_sha.clone())),
        );
        Ok(CommitRef { sha })
    }

    async fn update_ref(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
        commit_sha: &str,
    ) -> Result<RefUpdate, ForgeError> {
        self.record(MockOperation::UpdateRef {
            branch: branch.to_string(),
            sha: commit_sha.to_string(),
        });
        self.check_fail("update_ref")?;

        let mut inner = self.lock();
        let current = inner
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("Reference does not exist: {}", branch)))?;
        let parent = inner
            .commits
            .get(commit_sha)
            .and_then(|(_, parent)| parent.clone());

        if !inner.force_ref_update && parent.as_deref() != Some(current.as_str()) {
            return Err(ForgeError::Conflict("Update is not a fast forward".into()));
        }

        inner
            .branches
            .insert(branch.to_string(), commit_sha.to_string());
        Ok(RefUpdate {
            ref_name: format!("refs/heads/{}", branch),
            sha: commit_sha.to_string(),
        })
    }

    async fn put_file(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
        request: &PutFileRequest,
    ) -> Result<RemoteFile, ForgeError> {
        self.record(MockOperation::PutFile {
            path: path.to_string(),
            request: request.clone(),
        });
        self.check_fail("put_file")?;

        let mut inner = self.lock();
        let head = inner
            .branches
            .get(&request.branch)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("Branch not found: {}", request.branch)))?;

        let sha = inner.next_sha("blob");
        inner.blobs.insert(sha.clone(), request.content.clone());

        // Server side blob + tree + commit + ref in one step.
        let base_tree = inner
            .commits
            .get(&head)
            .map(|(tree, _)| tree.clone())
            .unwrap_or_default();
        let mut entries = inner.trees.get(&base_tree).cloned().unwrap_or_default();
        entries.retain(|e| e.path != path);
        entries.push(TreeEntry {
            sha: sha.clone(),
            path: path.to_string(),
        });
        let tree = inner.next_sha("tree");
        inner.trees.insert(tree.clone(), entries);
        let commit = inner.next_sha("commit");
        inner.commits.insert(commit.clone(), (tree, Some(head)));
        inner.branches.insert(request.branch.clone(), commit);

        let size = ImagePayload::Base64(request.content.clone()).len() as u64;
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        Ok(RemoteFile {
            name,
            content_hash: sha,
            path: path.to_string(),
            size,
        })
    }
}
