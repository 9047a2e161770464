use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("no version to select")]
    NoVersionToSelect,

    #[error("no matching release download found")]
    NoReleaseDownload,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{context} ({}): {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UpgradeError {
    #[must_use]
    pub fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for the two selection outcomes that callers treat as "nothing to
    /// upgrade to" rather than as a failure.
    #[must_use]
    pub fn is_nothing_to_upgrade(&self) -> bool {
        matches!(self, Self::NoVersionToSelect | Self::NoReleaseDownload)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("autoupgrade disabled")]
    Disabled,

    #[error("{context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("download failed with HTTP {status}")]
    HttpStatus { status: reqwest::StatusCode },

    #[error("{context}: {details}")]
    Archive {
        context: &'static str,
        details: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} exceeds the {limit} byte limit")]
    TooLarge { what: &'static str, limit: u64 },

    #[error("no binary found in archive {archive}")]
    BinaryNotFound { archive: String },

    #[error("unsupported archive format: {name}")]
    UnsupportedArchive { name: String },
}

impl FetchError {
    #[must_use]
    pub fn http(context: &'static str, source: reqwest::Error) -> Self {
        Self::Http { context, source }
    }

    #[must_use]
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    #[must_use]
    pub fn archive(context: &'static str, details: impl std::fmt::Display) -> Self {
        Self::Archive {
            context,
            details: details.to_string(),
        }
    }
}
