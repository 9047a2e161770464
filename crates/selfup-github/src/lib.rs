//! Default network collaborators for `selfup`.
//!
//! - [`GitHubReleaseSource`] reads a GitHub-style JSON release list.
//! - [`HttpArchiveFetcher`] downloads a release archive and pulls the binary
//!   out of it.
//! - [`DisabledArchiveFetcher`] refuses every download.

mod archive;
mod source;

pub use archive::{
    DEFAULT_MAX_ARCHIVE_SIZE, DEFAULT_MAX_BINARY_SIZE, DisabledArchiveFetcher, HttpArchiveFetcher,
    extract_binary,
};
pub use source::{GitHubAsset, GitHubRelease, GitHubReleaseSource};
