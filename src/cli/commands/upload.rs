//! upload command - Publish image files to GitHub

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context as _, Result};

use super::auth::github_token;
use super::Context;
use crate::cli::args::UploadArgs;
use crate::core::config::{Config, TargetOverrides};
use crate::core::types::{ImagePayload, UploadItem, UploadedImage};
use crate::forge::github::{parse_github_url, GitHubForge};
use crate::publish::{PublishOptions, Publisher, SessionState};
use crate::ui::output;

/// Run the upload command.
pub fn upload(ctx: &Context, args: &UploadArgs) -> Result<()> {
    if args.single && args.files.len() != 1 {
        bail!("--single takes exactly one file, got {}.", args.files.len());
    }

    let config = Config::load().context("Failed to load config")?;
    let target = config
        .user_config(&overrides(args)?)
        .context("Incomplete upload target")?;

    let mut items = load_items(&args.files, args)?;

    let token = github_token()?;
    let forge = match config.api_base() {
        Some(base) => GitHubForge::with_api_base(token, base),
        None => GitHubForge::new(token),
    }
    .force_ref_update(config.force_ref_update());

    let options = PublishOptions {
        concurrency: args
            .concurrency
            .map(usize::from)
            .unwrap_or_else(|| config.concurrency()),
    };

    let publisher = Publisher::new(&forge, target).with_options(options);
    let target = publisher.config();

    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let mut state = SessionState::new();

    let uploaded = if args.single {
        rt.block_on(upload_single(&publisher, &mut state, &mut items))?
    } else {
        rt.block_on(upload_batch(ctx, &publisher, &mut state, &mut items))?
    };

    for filename in &state.failed {
        output::warn(format!("{} was not uploaded", filename), ctx.verbosity);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&uploaded)?);
    } else if !uploaded.is_empty() {
        output::success(
            format!(
                "Uploaded {} image(s) to {}/{}@{}",
                uploaded.len(),
                target.owner,
                target.selected_repo,
                target.selected_branch
            ),
            ctx.verbosity,
        );
        output::print(output::format_uploaded(&uploaded), ctx.verbosity);
    }

    if uploaded.is_empty() {
        bail!("No image was uploaded.");
    }
    Ok(())
}

async fn upload_single(
    publisher: &Publisher<'_>,
    state: &mut SessionState,
    items: &mut [UploadItem],
) -> Result<Vec<UploadedImage>> {
    let item = items
        .first_mut()
        .ok_or_else(|| anyhow!("No file to upload."))?;

    if publisher.publish_single(state, item).await {
        Ok(item.uploaded.iter().cloned().collect())
    } else {
        bail!(
            "Failed to upload {}. Run with --verbose for details.",
            item.filename
        )
    }
}

async fn upload_batch(
    ctx: &Context,
    publisher: &Publisher<'_>,
    state: &mut SessionState,
    items: &mut [UploadItem],
) -> Result<Vec<UploadedImage>> {
    match publisher.publish(state, items).await {
        Ok(report) => {
            if let Some(commit) = &report.commit {
                output::print(
                    format!("Committed {}", output::short_sha(commit)),
                    ctx.verbosity,
                );
            }
            Ok(report.uploaded)
        }
        Err(e) => {
            if e.is_branch_moved() {
                output::warn(
                    format!(
                        "branch '{}' moved during the upload; retry, or set force_ref_update",
                        publisher.config().selected_branch
                    ),
                    ctx.verbosity,
                );
            }
            if e.blobs_orphaned() {
                log::info!(
                    "{} uploaded blob(s) left unreferenced: {}",
                    e.orphaned_blobs().len(),
                    e.orphaned_blobs().join(", ")
                );
            }
            let step = e.step();
            Err(anyhow::Error::new(e).context(format!("Upload failed ({})", step)))
        }
    }
}

/// Flag values layered over the config file.
fn overrides(args: &UploadArgs) -> Result<TargetOverrides> {
    let (owner, repo) = match &args.remote {
        Some(url) => {
            let (owner, repo) = parse_github_url(url)
                .ok_or_else(|| anyhow!("'{}' is not a GitHub repository URL.", url))?;
            (Some(owner), Some(repo))
        }
        None => (args.owner.clone(), args.repo.clone()),
    };

    Ok(TargetOverrides {
        owner,
        repo,
        branch: args.branch.clone(),
        dir: args.dir.clone(),
        email: args.email.clone(),
    })
}

/// Read `files` into upload items named after their base names.
///
/// Re-upload flags apply to a single file only.
pub fn load_items(files: &[PathBuf], args: &UploadArgs) -> Result<Vec<UploadItem>> {
    let re_upload = match (&args.re_upload_dir, &args.re_upload_path) {
        (Some(dir), Some(path)) => {
            if files.len() != 1 {
                bail!("--re-upload-path replaces one image; got {} files.", files.len());
            }
            Some((dir.clone(), path.clone()))
        }
        _ => None,
    };

    files
        .iter()
        .map(|path| {
            let item = read_item(path)?;
            Ok(match &re_upload {
                Some((dir, original)) => item.with_re_upload(dir.clone(), original.clone()),
                None => item,
            })
        })
        .collect()
}

fn read_item(path: &Path) -> Result<UploadItem> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("'{}' has no usable file name.", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    log::debug!("read {} ({} bytes)", path.display(), bytes.len());
    Ok(UploadItem::new(filename, ImagePayload::Bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(temp: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = temp.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn items_use_base_names() {
        let temp = TempDir::new().unwrap();
        let files = vec![write(&temp, "a.png", b"aa"), write(&temp, "b.png", b"b")];

        let items = load_items(&files, &UploadArgs::default()).unwrap();

        assert_eq!(items[0].filename, "a.png");
        assert_eq!(items[1].payload.len(), 1);
        assert!(items.iter().all(|item| item.re_upload.is_none()));
    }

    #[test]
    fn re_upload_applies_to_single_file() {
        let temp = TempDir::new().unwrap();
        let args = UploadArgs {
            re_upload_dir: Some("archive".into()),
            re_upload_path: Some("archive/a.png".into()),
            ..Default::default()
        };

        let one = vec![write(&temp, "new.png", b"x")];
        let items = load_items(&one, &args).unwrap();
        assert_eq!(items[0].active_re_upload().unwrap().path, "archive/a.png");

        let two = vec![one[0].clone(), write(&temp, "other.png", b"y")];
        assert!(load_items(&two, &args).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = vec![temp.path().join("nope.png")];
        let err = load_items(&missing, &UploadArgs::default()).unwrap_err();
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn remote_url_sets_owner_and_repo() {
        let args = UploadArgs {
            remote: Some("https://github.com/octocat/pics".into()),
            dir: Some("photos".into()),
            ..Default::default()
        };
        let overrides = overrides(&args).unwrap();
        assert_eq!(overrides.owner.as_deref(), Some("octocat"));
        assert_eq!(overrides.repo.as_deref(), Some("pics"));
        assert_eq!(overrides.dir.as_deref(), Some("photos"));

        let bad = UploadArgs {
            remote: Some("not a url".into()),
            ..Default::default()
        };
        assert!(super::overrides(&bad).is_err());
    }
}
