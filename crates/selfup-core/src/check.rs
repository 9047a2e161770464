use selfup_backend::{Release, ReleaseNaming, ReleaseSource, UpgradeError, UpgradeObserver};

use crate::select::select_latest_release;
use crate::version::is_newer_version;

/// Fetch the published releases and select the best one for this platform.
///
/// # Errors
/// Returns [`UpgradeError::NoVersionToSelect`] when the source returned
/// nothing, and [`UpgradeError::NoReleaseDownload`] when no release fits.
pub async fn latest_release(
    source: &dyn ReleaseSource,
    current: &str,
    allow_prerelease: bool,
    naming: &dyn ReleaseNaming,
    observer: &dyn UpgradeObserver,
) -> Result<Release, UpgradeError> {
    let releases = source.fetch_releases(current).await;
    select_latest_release(releases, current, allow_prerelease, naming, observer)
}

/// Return the release worth upgrading to, if any.
///
/// A selection that is not newer than `current` is treated as "up to date".
///
/// # Errors
/// Only errors other than the two "nothing to upgrade" outcomes are returned.
pub async fn check_for_upgrade(
    source: &dyn ReleaseSource,
    current: &str,
    allow_prerelease: bool,
    naming: &dyn ReleaseNaming,
    observer: &dyn UpgradeObserver,
) -> Result<Option<Release>, UpgradeError> {
    match latest_release(source, current, allow_prerelease, naming, observer).await {
        Ok(release) if is_newer_version(&release.tag, current) => Ok(Some(release)),
        Ok(_) => Ok(None),
        Err(error) if error.is_nothing_to_upgrade() => Ok(None),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use selfup_backend::{Asset, NoopObserver};

    use super::*;

    struct FixedSource(Vec<Release>);

    #[async_trait]
    impl ReleaseSource for FixedSource {
        async fn fetch_releases(&self, _current_version: &str) -> Vec<Release> {
            self.0.clone()
        }
    }

    fn naming(tag: &str) -> Vec<String> {
        vec![format!("selfup-linux-amd64-{tag}.")]
    }

    fn release(tag: &str) -> Release {
        Release::new(
            tag,
            false,
            vec![Asset::new(
                format!("selfup-linux-amd64-{tag}.tar.gz"),
                format!("https://example.invalid/{tag}"),
            )],
        )
    }

    #[tokio::test]
    async fn empty_source_means_no_version_to_select() {
        let source = FixedSource(Vec::new());
        let result = latest_release(&source, "v1.0.0", false, &naming, &NoopObserver).await;

        assert!(matches!(result, Err(UpgradeError::NoVersionToSelect)));
    }

    #[tokio::test]
    async fn check_reports_newer_release() {
        let source = FixedSource(vec![release("v1.0.0"), release("v1.0.1")]);

        let upgrade = check_for_upgrade(&source, "v1.0.0", false, &naming, &NoopObserver)
            .await
            .expect("check should succeed");

        assert_eq!(upgrade.map(|r| r.tag), Some("v1.0.1".to_string()));
    }

    #[tokio::test]
    async fn check_is_none_when_up_to_date() {
        let source = FixedSource(vec![release("v0.9.0"), release("v1.0.0")]);

        let upgrade = check_for_upgrade(&source, "v1.0.0", false, &naming, &NoopObserver)
            .await
            .expect("check should succeed");

        assert!(upgrade.is_none());
    }

    #[tokio::test]
    async fn check_is_none_when_nothing_is_available() {
        let empty = check_for_upgrade(
            &FixedSource(Vec::new()),
            "v1.0.0",
            false,
            &naming,
            &NoopObserver,
        )
        .await
        .expect("empty source is not an error");
        assert!(empty.is_none());

        let no_asset = FixedSource(vec![Release::new("v2.0.0", false, Vec::new())]);
        let upgrade = check_for_upgrade(&no_asset, "v1.0.0", false, &naming, &NoopObserver)
            .await
            .expect("missing asset is not an error");
        assert!(upgrade.is_none());
    }
}
