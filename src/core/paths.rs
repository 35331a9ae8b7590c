//! core::paths
//!
//! Remote path computation for upload items.
//!
//! # Rules
//!
//! - A re-upload always targets its original path, whatever directory is
//!   currently selected.
//! - Otherwise the path is `{dir}/{filename}`; the root directory (`"/"`)
//!   contributes no prefix.
//!
//! Everything here is pure.
//!
//! # Example
//!
//! ```
//! use gitpix::core::paths::resolve_path;
//! use gitpix::core::types::{ImagePayload, UploadItem, UserConfig};
//!
//! let config = UserConfig::new("octocat", "pics", "main", "photos");
//! let item = UploadItem::new("a.png", ImagePayload::Bytes(vec![]));
//! assert_eq!(resolve_path(&config, &item), "photos/a.png");
//! ```

use super::types::{UploadItem, UserConfig};

/// Sentinel for the repository root directory.
pub const ROOT_DIR: &str = "/";

/// Normalize a directory to the form stored in [`UserConfig`].
///
/// Leading and trailing slashes are dropped; an empty result is the root.
pub fn normalize_dir(dir: &str) -> String {
    let trimmed = dir.trim().trim_matches('/');
    if trimmed.is_empty() {
        ROOT_DIR.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Prefix shared by every path written into `dir`.
///
/// `""` for the root, `"{dir}/"` otherwise.
pub fn dir_prefix(dir: &str) -> String {
    let dir = normalize_dir(dir);
    if dir == ROOT_DIR {
        String::new()
    } else {
        format!("{}/", dir)
    }
}

/// Remote path for `item` under the selected directory.
pub fn resolve_path(config: &UserConfig, item: &UploadItem) -> String {
    if let Some(info) = item.active_re_upload() {
        return info.path.clone();
    }
    format!("{}{}", dir_prefix(&config.selected_dir), item.filename)
}

/// Contents API endpoint (relative to the API base) for `item`.
pub fn contents_endpoint(config: &UserConfig, item: &UploadItem) -> String {
    format!(
        "repos/{}/{}/contents/{}",
        config.owner,
        config.selected_repo,
        resolve_path(config, item)
    )
}
