//! ui::output
//!
//! User-facing output.
//!
//! # Design
//!
//! Everything meant for the user goes through here and respects `--quiet`.
//! Diagnostics go through `log` instead.

use std::fmt::Display;

use crate::core::types::UploadedImage;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    pub fn is_quiet(self) -> bool {
        self == Verbosity::Quiet
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if !verbosity.is_quiet() {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if !verbosity.is_quiet() {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if !verbosity.is_quiet() {
        println!("✓ {}", message);
    }
}

/// One line per published image.
pub fn format_uploaded(images: &[UploadedImage]) -> String {
    format_list(
        &images.iter().map(|image| image.path.as_str()).collect::<Vec<_>>(),
        "  ",
    )
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Short form of a commit hash.
pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn verbosity_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn uploaded_list() {
        let image = |path: &str| UploadedImage {
            uuid: Uuid::nil(),
            kind: "image".into(),
            dir: "/".into(),
            name: path.into(),
            content_hash: "h".into(),
            path: path.into(),
            size: 0,
            checked: false,
            deleting: false,
        };
        assert_eq!(
            format_uploaded(&[image("a.png"), image("b.png")]),
            "  a.png\n  b.png"
        );
    }

    #[test]
    fn short_sha_handles_short_input() {
        assert_eq!(short_sha("0123456789abcdef"), "0123456");
        assert_eq!(short_sha("abc"), "abc");
    }
}
