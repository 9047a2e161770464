use selfup_backend::UpgradeError;
use thiserror::Error;

use crate::lock::AcquireError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),
    #[error(transparent)]
    Lock(#[from] AcquireError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to {action} settings: {source}")]
    Settings {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn settings(action: &'static str, source: std::io::Error) -> Self {
        Self::Settings { action, source }
    }

    /// Hint printed under the error message, when there is a useful one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Upgrade(UpgradeError::Fetch(selfup_backend::FetchError::Disabled)) => {
                Some("set \"auto_upgrade\": true in the settings file to allow upgrades")
            }
            Self::Upgrade(UpgradeError::Io { .. }) => {
                Some("check that the binary and its directory are writable")
            }
            Self::Lock(AcquireError::AlreadyRunning) => {
                Some("wait for the other upgrade to finish and try again")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use selfup_backend::{FetchError, UpgradeError};

    use super::AppError;
    use crate::lock::AcquireError;

    #[test]
    fn upgrade_errors_display_transparently() {
        let error = AppError::from(UpgradeError::NoReleaseDownload);

        assert_eq!(
            error.to_string(),
            UpgradeError::NoReleaseDownload.to_string()
        );
    }

    #[test]
    fn disabled_fetch_has_hint() {
        let error = AppError::from(UpgradeError::Fetch(FetchError::Disabled));

        let hint = error.hint().expect("disabled fetch should carry a hint");
        assert!(hint.contains("auto_upgrade"));
    }

    #[test]
    fn lock_contention_has_hint() {
        let error = AppError::from(AcquireError::AlreadyRunning);

        assert!(error.hint().is_some());
    }

    #[test]
    fn settings_error_names_action() {
        let error = AppError::settings("save", std::io::Error::other("read-only"));

        assert_eq!(error.to_string(), "failed to save settings: read-only");
        assert!(error.hint().is_none());
    }
}
