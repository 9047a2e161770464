use selfup_backend::{
    Release, ReleaseNaming, UpgradeError, UpgradeEvent, UpgradeObserver, VersionRelation,
};

use crate::version::{compare_versions, ordering};

/// Pick the release to upgrade to from `releases`.
///
/// Candidates are walked from the lowest tag up, so the accumulator always
/// holds the newest release seen so far that is allowed and ships an asset for
/// this platform. When a major upgrade is reached after a minor or patch
/// upgrade has already been found, the minor one is returned so the major jump
/// can happen on a later check. Releases without a tag are never selected.
///
/// # Errors
/// Returns [`UpgradeError::NoVersionToSelect`] when `releases` is empty and
/// [`UpgradeError::NoReleaseDownload`] when no candidate was acceptable.
pub fn select_latest_release(
    mut releases: Vec<Release>,
    current: &str,
    allow_prerelease: bool,
    naming: &dyn ReleaseNaming,
    observer: &dyn UpgradeObserver,
) -> Result<Release, UpgradeError> {
    if releases.is_empty() {
        return Err(UpgradeError::NoVersionToSelect);
    }

    releases.retain(|release| !release.tag.trim().is_empty());
    releases.sort_by(|a, b| ordering(compare_versions(&a.tag, &b.tag)));

    let mut selected: Option<Release> = None;
    for release in releases {
        if compare_versions(&release.tag, current) == VersionRelation::MajorNewer
            && let Some(minor) = selected
                .take_if(|found| compare_versions(&found.tag, current) == VersionRelation::Newer)
        {
            observer.on_event(&UpgradeEvent::DeferredMajor {
                selected: minor.tag.clone(),
                major: release.tag,
            });
            return Ok(minor);
        }

        if release.prerelease && !allow_prerelease {
            observer.on_event(&UpgradeEvent::SkippedPrerelease { tag: release.tag });
            continue;
        }

        let prefixes = naming.release_names(&release.tag);
        if release.matching_asset(&prefixes).is_some() {
            observer.on_event(&UpgradeEvent::Selected {
                tag: release.tag.clone(),
            });
            selected = Some(release);
        } else {
            observer.on_event(&UpgradeEvent::NoMatchingAsset { tag: release.tag });
        }
    }

    selected.ok_or(UpgradeError::NoReleaseDownload)
}
