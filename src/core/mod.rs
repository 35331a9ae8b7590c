//! core
//!
//! Domain types, path rules, and configuration.
//!
//! # Modules
//!
//! - [`types`] - Upload items, uploaded-image records, and git object handles
//! - [`paths`] - Remote path computation
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod paths;
pub mod types;
