//! gitpix - Publish images to a GitHub repository
//!
//! gitpix uploads local images into a directory of a GitHub repository.
//! A batch of images lands as one commit built from the git-data primitives
//! (blobs, one tree, one commit, one ref update); a single image can take the
//! contents API fast path instead.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to publish)
//! - [`core`] - Domain types, path resolution, configuration
//! - [`forge`] - The remote content store abstraction and its GitHub and
//!   in-memory implementations
//! - [`publish`] - Batch and single publishers and local state reconciliation
//! - [`secrets`] - Token storage and lookup
//! - [`ui`] - User-facing output
//!
//! # Invariants
//!
//! 1. Local state is only updated after the remote store accepted the change
//! 2. A batch moves the branch at most once, to a commit whose parent is the
//!    head observed at the start of the batch
//! 3. A failed blob upload never aborts the rest of the batch

pub mod cli;
pub mod core;
pub mod forge;
pub mod publish;
pub mod secrets;
pub mod ui;
