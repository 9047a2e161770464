use serde::{Deserialize, Serialize};

/// A single downloadable artifact within a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub url: String,
}

impl Asset {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// The asset name with any leading path components stripped.
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn matches_any(&self, prefixes: &[String]) -> bool {
        let base = self.base_name();
        prefixes.iter().any(|prefix| base.starts_with(prefix.as_str()))
    }
}

/// One published version of the software with its platform assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    #[must_use]
    pub fn new(tag: impl Into<String>, prerelease: bool, assets: Vec<Asset>) -> Self {
        Self {
            tag: tag.into(),
            prerelease,
            assets,
        }
    }

    /// Returns the first asset whose base name starts with one of `prefixes`.
    #[must_use]
    pub fn matching_asset(&self, prefixes: &[String]) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.matches_any(prefixes))
    }
}

/// How one version tag relates to another.
///
/// The `Major*` variants are reserved for a difference in the major component;
/// every other ordering difference is `Older` or `Newer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionRelation {
    MajorOlder,
    Older,
    Equal,
    Newer,
    MajorNewer,
}

impl VersionRelation {
    /// The relation seen from the other side of the comparison.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::MajorOlder => Self::MajorNewer,
            Self::Older => Self::Newer,
            Self::Equal => Self::Equal,
            Self::Newer => Self::Older,
            Self::MajorNewer => Self::MajorOlder,
        }
    }

    #[must_use]
    pub fn is_newer(self) -> bool {
        matches!(self, Self::Newer | Self::MajorNewer)
    }
}
