use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::FetchError;
use crate::types::Release;

/// Supplies the list of published releases.
///
/// Implementations swallow transport and parse problems and return an empty
/// list instead; an empty list means "nothing available".
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn fetch_releases(&self, current_version: &str) -> Vec<Release>;
}

/// Downloads a release asset and extracts the binary it contains.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Returns the path of the extracted binary, which must live inside
    /// `destination_dir` so it can be renamed over the running binary.
    async fn download_and_extract(
        &self,
        asset_name: &str,
        destination_dir: &Path,
        url: &str,
    ) -> Result<PathBuf, FetchError>;
}

/// Produces the asset-name prefixes the running platform accepts for a tag.
pub trait ReleaseNaming: Send + Sync {
    fn release_names(&self, tag: &str) -> Vec<String>;
}

/// Diagnostic events emitted while selecting and installing a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeEvent {
    SkippedPrerelease { tag: String },
    NoMatchingAsset { tag: String },
    Selected { tag: String },
    DeferredMajor { selected: String, major: String },
    ConsideringAsset { name: String },
    Downloading { asset: String, url: String },
    StaleBackupNotRemoved { path: PathBuf, error: String },
    MovedAside { from: PathBuf, to: PathBuf },
    Replaced { binary: PathBuf },
    RolledBack { binary: PathBuf, error: String },
    RollbackFailed { binary: PathBuf, error: String },
}

pub trait UpgradeObserver: Send + Sync {
    fn on_event(&self, event: &UpgradeEvent);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl UpgradeObserver for NoopObserver {
    fn on_event(&self, _event: &UpgradeEvent) {}
}

impl<F> ReleaseNaming for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn release_names(&self, tag: &str) -> Vec<String> {
        self(tag)
    }
}
