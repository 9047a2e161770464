use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use selfup_backend::{
    ArchiveFetcher, Asset, FetchError, NoopObserver, Release, ReleaseSource, UpgradeError,
};
use selfup_core::{Installer, backup_path, check_for_upgrade, latest_release};
use tempfile::tempdir;

struct StaticSource(Vec<Release>);

#[async_trait]
impl ReleaseSource for StaticSource {
    async fn fetch_releases(&self, _current_version: &str) -> Vec<Release> {
        self.0.clone()
    }
}

/// Serves binary contents keyed by asset URL.
struct MemoryFetcher {
    payloads: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl ArchiveFetcher for MemoryFetcher {
    async fn download_and_extract(
        &self,
        asset_name: &str,
        destination_dir: &Path,
        url: &str,
    ) -> Result<PathBuf, FetchError> {
        let payload = self
            .payloads
            .get(url)
            .ok_or_else(|| FetchError::BinaryNotFound {
                archive: asset_name.to_string(),
            })?;
        let path = destination_dir.join(format!(".{asset_name}.extracted"));
        std::fs::write(&path, payload).map_err(|e| FetchError::io("write payload", e))?;
        Ok(path)
    }
}

fn naming(tag: &str) -> Vec<String> {
    vec![
        format!("selfup-macos-arm64-{tag}."),
        format!("selfup-macosx-arm64-{tag}."),
    ]
}

fn release(tag: &str, prerelease: bool) -> Release {
    Release::new(
        tag,
        prerelease,
        vec![
            Asset::new(
                format!("selfup-linux-amd64-{tag}.tar.gz"),
                format!("https://dl.invalid/{tag}/linux"),
            ),
            Asset::new(
                format!("selfup-macosx-arm64-{tag}.zip"),
                format!("https://dl.invalid/{tag}/mac"),
            ),
        ],
    )
}

fn fetcher_for(releases: &[Release]) -> MemoryFetcher {
    MemoryFetcher {
        payloads: releases
            .iter()
            .map(|r| {
                (
                    format!("https://dl.invalid/{}/mac", r.tag),
                    format!("binary {}", r.tag).into_bytes(),
                )
            })
            .collect(),
    }
}

#[tokio::test]
async fn check_then_install_replaces_binary_and_keeps_backup() {
    let releases = vec![
        release("v1.0.0", false),
        release("v1.2.0", false),
        release("v1.3.0-rc.1", true),
        release("v2.0.0", false),
    ];
    let source = StaticSource(releases.clone());
    let fetcher = fetcher_for(&releases);
    let temp = tempdir().expect("create temp dir");
    let binary = temp.path().join("selfup");
    std::fs::write(&binary, b"binary v1.0.0").expect("write current binary");

    let selected = check_for_upgrade(&source, "v1.0.0", false, &naming, &NoopObserver)
        .await
        .expect("check succeeds")
        .expect("an upgrade is available");
    assert_eq!(selected.tag, "v1.2.0");

    Installer::new(&fetcher, &naming, &NoopObserver)
        .upgrade_to(&binary, &selected)
        .await
        .expect("install succeeds");

    assert_eq!(
        std::fs::read(&binary).expect("read binary"),
        b"binary v1.2.0"
    );
    assert_eq!(
        std::fs::read(backup_path(&binary)).expect("read backup"),
        b"binary v1.0.0"
    );

    let leftovers: Vec<_> = std::fs::read_dir(temp.path())
        .expect("list temp dir")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".extracted"))
        .collect();
    assert!(leftovers.is_empty(), "extracted files left: {leftovers:?}");
}

#[tokio::test]
async fn second_upgrade_replaces_previous_backup() {
    let releases = vec![release("v1.1.0", false), release("v1.2.0", false)];
    let fetcher = fetcher_for(&releases);
    let temp = tempdir().expect("create temp dir");
    let binary = temp.path().join("selfup");
    std::fs::write(&binary, b"binary v1.0.0").expect("write current binary");
    let installer = Installer::new(&fetcher, &naming, &NoopObserver);

    installer
        .upgrade_to(&binary, &releases[0])
        .await
        .expect("first upgrade succeeds");
    installer
        .upgrade_to(&binary, &releases[1])
        .await
        .expect("second upgrade succeeds");

    assert_eq!(
        std::fs::read(&binary).expect("read binary"),
        b"binary v1.2.0"
    );
    assert_eq!(
        std::fs::read(backup_path(&binary)).expect("read backup"),
        b"binary v1.1.0"
    );
}

#[tokio::test]
async fn failed_download_leaves_binary_untouched() {
    let temp = tempdir().expect("create temp dir");
    let binary = temp.path().join("selfup");
    std::fs::write(&binary, b"binary v1.0.0").expect("write current binary");
    let fetcher = MemoryFetcher {
        payloads: HashMap::new(),
    };

    let result = Installer::new(&fetcher, &naming, &NoopObserver)
        .upgrade_to(&binary, &release("v1.1.0", false))
        .await;

    assert!(matches!(
        result,
        Err(UpgradeError::Fetch(FetchError::BinaryNotFound { .. }))
    ));
    assert_eq!(
        std::fs::read(&binary).expect("read binary"),
        b"binary v1.0.0"
    );
    assert!(!backup_path(&binary).exists());
}

#[tokio::test]
async fn prerelease_is_chosen_only_when_allowed() {
    let source = StaticSource(vec![release("v1.1.0-rc1", true)]);

    let denied = latest_release(&source, "v1.0.0", false, &naming, &NoopObserver).await;
    assert!(matches!(denied, Err(UpgradeError::NoReleaseDownload)));

    let allowed = latest_release(&source, "v1.0.0", true, &naming, &NoopObserver)
        .await
        .expect("pre-release selected when allowed");
    assert_eq!(allowed.tag, "v1.1.0-rc1");
}
