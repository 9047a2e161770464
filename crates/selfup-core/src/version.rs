use selfup_backend::VersionRelation;
use semver::Version;
use std::cmp::Ordering;

/// Parse a release tag such as `v1.2.3`, `1.2` or `v2.0.0-rc.1`.
///
/// Missing minor and patch components are filled with zero. Returns `None`
/// for anything that is not version-shaped.
#[must_use]
pub fn parse_version(tag: &str) -> Option<Version> {
    let trimmed = tag.trim();
    let version = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);

    if let Ok(parsed) = Version::parse(version) {
        return Some(parsed);
    }

    let (core, suffix) = split_core_and_suffix(version);
    let mut parts = core.split('.');
    let major = parts.next()?.parse::<u64>().ok()?;
    let minor = parts.next().map(str::parse::<u64>);
    let patch = parts.next().map(str::parse::<u64>);

    if parts.next().is_some() {
        return None;
    }

    let normalized = match (minor, patch) {
        (None, None) => format!("{major}.0.0{suffix}"),
        (Some(Ok(minor)), None) => format!("{major}.{minor}.0{suffix}"),
        (Some(Ok(minor)), Some(Ok(patch))) => format!("{major}.{minor}.{patch}{suffix}"),
        _ => return None,
    };

    Version::parse(&normalized).ok()
}

fn split_core_and_suffix(version: &str) -> (&str, &str) {
    let suffix_idx = version.find(['-', '+']).unwrap_or(version.len());
    (&version[..suffix_idx], &version[suffix_idx..])
}

// Build metadata is ignored; a pre-release sorts below its release.
fn precedence(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// Classify how tag `a` relates to tag `b`.
///
/// Unparseable tags never panic: they rank below every parseable tag, and two
/// unparseable tags are ordered by their raw text. This keeps the relation a
/// total order, so it is safe to sort with.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> VersionRelation {
    match (parse_version(a), parse_version(b)) {
        (Some(left), Some(right)) => {
            let major_differs = left.major != right.major;
            match precedence(&left, &right) {
                Ordering::Equal => VersionRelation::Equal,
                Ordering::Greater if major_differs => VersionRelation::MajorNewer,
                Ordering::Greater => VersionRelation::Newer,
                Ordering::Less if major_differs => VersionRelation::MajorOlder,
                Ordering::Less => VersionRelation::Older,
            }
        }
        (Some(_), None) => VersionRelation::Newer,
        (None, Some(_)) => VersionRelation::Older,
        (None, None) => match a.trim().cmp(b.trim()) {
            Ordering::Equal => VersionRelation::Equal,
            Ordering::Greater => VersionRelation::Newer,
            Ordering::Less => VersionRelation::Older,
        },
    }
}

/// True when `latest` is any kind of upgrade over `current`.
#[must_use]
pub fn is_newer_version(latest: &str, current: &str) -> bool {
    compare_versions(latest, current).is_newer()
}

pub(crate) fn ordering(relation: VersionRelation) -> Ordering {
    match relation {
        VersionRelation::MajorOlder | VersionRelation::Older => Ordering::Less,
        VersionRelation::Equal => Ordering::Equal,
        VersionRelation::Newer | VersionRelation::MajorNewer => Ordering::Greater,
    }
}
