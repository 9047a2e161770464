use std::ffi::OsString;
use std::path::{Path, PathBuf};

use selfup_backend::{
    ArchiveFetcher, Release, ReleaseNaming, UpgradeError, UpgradeEvent, UpgradeObserver,
};

/// Downloads release assets and swaps them in for an existing binary.
pub struct Installer<'a> {
    fetcher: &'a dyn ArchiveFetcher,
    naming: &'a dyn ReleaseNaming,
    observer: &'a dyn UpgradeObserver,
}

impl<'a> Installer<'a> {
    #[must_use]
    pub fn new(
        fetcher: &'a dyn ArchiveFetcher,
        naming: &'a dyn ReleaseNaming,
        observer: &'a dyn UpgradeObserver,
    ) -> Self {
        Self {
            fetcher,
            naming,
            observer,
        }
    }

    /// Replace `binary` with the platform asset of `release`.
    ///
    /// The previous binary is kept next to it as `<binary>.old`.
    ///
    /// # Errors
    /// Returns [`UpgradeError::NoReleaseDownload`] when the release has no
    /// asset for this platform, the fetcher's error when the download fails, and
    /// an I/O error when the swap fails. After an error the binary is either
    /// untouched or restored.
    pub async fn upgrade_to(&self, binary: &Path, release: &Release) -> Result<(), UpgradeError> {
        let prefixes = self.naming.release_names(&release.tag);

        for asset in &release.assets {
            self.observer.on_event(&UpgradeEvent::ConsideringAsset {
                name: asset.base_name().to_string(),
            });
            if asset.matches_any(&prefixes) {
                return self
                    .install_asset(asset.base_name(), binary, &asset.url)
                    .await;
            }
        }

        Err(UpgradeError::NoReleaseDownload)
    }

    /// Replace `binary` with the archive at `url`, bypassing release selection.
    ///
    /// # Errors
    /// Fails like [`Installer::upgrade_to`] once the download starts.
    pub async fn upgrade_to_url(&self, binary: &Path, url: &str) -> Result<(), UpgradeError> {
        self.install_asset(asset_name_from_url(url), binary, url)
            .await
    }

    /// Upgrade the executable of the current process.
    ///
    /// Symlinks are resolved so the real file is replaced. Returns the path that
    /// was upgraded.
    ///
    /// # Errors
    /// Returns an error if the executable cannot be located, or any error from
    /// [`Installer::upgrade_to`].
    pub async fn upgrade_running_binary(&self, release: &Release) -> Result<PathBuf, UpgradeError> {
        let binary = running_binary()?;
        self.upgrade_to(&binary, release).await?;
        Ok(binary)
    }

    async fn install_asset(
        &self,
        asset_name: &str,
        binary: &Path,
        url: &str,
    ) -> Result<(), UpgradeError> {
        self.observer.on_event(&UpgradeEvent::Downloading {
            asset: asset_name.to_string(),
            url: url.to_string(),
        });

        let extracted = self
            .fetcher
            .download_and_extract(asset_name, destination_dir(binary), url)
            .await?;
        let extracted = ExtractedBinary { path: extracted };

        swap_binary(binary, &extracted.path, self.observer)
    }
}

/// Path of the executable of the current process, with symlinks resolved.
///
/// # Errors
/// Returns an error if the executable cannot be located or resolved.
pub fn running_binary() -> Result<PathBuf, UpgradeError> {
    let exe = std::env::current_exe().map_err(|error| {
        UpgradeError::io(
            "failed to locate running binary",
            Path::new("<current executable>"),
            error,
        )
    })?;
    std::fs::canonicalize(&exe)
        .map_err(|error| UpgradeError::io("failed to resolve running binary", &exe, error))
}

/// Removes the extracted file when dropped, whatever happened to the swap.
struct ExtractedBinary {
    path: PathBuf,
}

impl Drop for ExtractedBinary {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// The path the previous binary is kept at after an upgrade.
#[must_use]
pub fn backup_path(binary: &Path) -> PathBuf {
    let mut name = OsString::from(binary.as_os_str());
    name.push(".old");
    PathBuf::from(name)
}

/// Move `new_binary` into place at `binary`, keeping the old one as
/// `<binary>.old`.
///
/// The binary path is never left empty: if the new file cannot be moved in,
/// the old one is renamed back before the error is returned.
///
/// # Errors
/// Returns an I/O error when either rename fails. A stale `<binary>.old` that
/// cannot be removed is reported to the observer only.
pub fn swap_binary(
    binary: &Path,
    new_binary: &Path,
    observer: &dyn UpgradeObserver,
) -> Result<(), UpgradeError> {
    let old = backup_path(binary);

    if let Err(error) = std::fs::remove_file(&old)
        && error.kind() != std::io::ErrorKind::NotFound
    {
        observer.on_event(&UpgradeEvent::StaleBackupNotRemoved {
            path: old.clone(),
            error: error.to_string(),
        });
    }

    std::fs::rename(binary, &old).map_err(|error| {
        UpgradeError::io("failed to move current binary aside", binary, error)
    })?;
    observer.on_event(&UpgradeEvent::MovedAside {
        from: binary.to_path_buf(),
        to: old.clone(),
    });

    if let Err(error) = std::fs::rename(new_binary, binary) {
        match std::fs::rename(&old, binary) {
            Ok(()) => observer.on_event(&UpgradeEvent::RolledBack {
                binary: binary.to_path_buf(),
                error: error.to_string(),
            }),
            Err(rollback_error) => observer.on_event(&UpgradeEvent::RollbackFailed {
                binary: binary.to_path_buf(),
                error: rollback_error.to_string(),
            }),
        }
        return Err(UpgradeError::io("failed to move new binary into place", binary, error));
    }

    observer.on_event(&UpgradeEvent::Replaced {
        binary: binary.to_path_buf(),
    });
    Ok(())
}

fn destination_dir(binary: &Path) -> &Path {
    match binary.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn asset_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
}
