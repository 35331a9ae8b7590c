//! forge
//!
//! Abstraction for the remote content repository.
//!
//! # Architecture
//!
//! The [`ContentStore`] trait exposes the git-data primitives a publish is
//! built from: branch lookup, blob, tree and commit creation, ref update, and
//! the single-call "put file contents" shortcut. Publishers only ever see the
//! trait.
//!
//! - Forge failures surface as [`ForgeError`] values, never panics
//! - Forge operations never touch local state; reconciling local state is
//!   the publisher's job
//!
//! # Modules
//!
//! - `traits`: Core `ContentStore` trait and request/response types
//! - [`github`]: GitHub implementation using the REST API
//! - [`mock`]: In-memory implementation for deterministic testing

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
