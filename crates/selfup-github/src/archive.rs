use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use selfup_backend::{ArchiveFetcher, FetchError};
use tokio::io::AsyncWriteExt;

pub const DEFAULT_MAX_ARCHIVE_SIZE: u64 = 16 << 20;
pub const DEFAULT_MAX_BINARY_SIZE: u64 = 64 << 20;

/// Downloads `.tar.gz` / `.zip` release archives and extracts the binary.
pub struct HttpArchiveFetcher {
    client: reqwest::Client,
    binary_name: String,
    max_archive_size: u64,
    max_binary_size: u64,
}

impl HttpArchiveFetcher {
    #[must_use]
    pub fn new(client: reqwest::Client, binary_name: impl Into<String>) -> Self {
        Self {
            client,
            binary_name: binary_name.into(),
            max_archive_size: DEFAULT_MAX_ARCHIVE_SIZE,
            max_binary_size: DEFAULT_MAX_BINARY_SIZE,
        }
    }

    #[must_use]
    pub fn with_limits(mut self, max_archive_size: u64, max_binary_size: u64) -> Self {
        self.max_archive_size = max_archive_size;
        self.max_binary_size = max_binary_size;
        self
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        use futures_util::StreamExt;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| FetchError::http("download request failed", error))?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status(),
            });
        }

        if response
            .content_length()
            .is_some_and(|length| length > self.max_archive_size)
        {
            return Err(FetchError::TooLarge {
                what: "archive",
                limit: self.max_archive_size,
            });
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|error| FetchError::io("failed to create download file", error))?;

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|error| FetchError::http("download stream error", error))?;
            downloaded += chunk.len() as u64;
            if downloaded > self.max_archive_size {
                return Err(FetchError::TooLarge {
                    what: "archive",
                    limit: self.max_archive_size,
                });
            }
            file.write_all(&chunk)
                .await
                .map_err(|error| FetchError::io("failed to write download data", error))?;
        }

        file.flush()
            .await
            .map_err(|error| FetchError::io("failed to flush download file", error))?;

        Ok(downloaded)
    }
}

#[async_trait]
impl ArchiveFetcher for HttpArchiveFetcher {
    async fn download_and_extract(
        &self,
        asset_name: &str,
        destination_dir: &Path,
        url: &str,
    ) -> Result<PathBuf, FetchError> {
        let archive = tempfile::Builder::new()
            .prefix(".selfup-download-")
            .tempfile_in(destination_dir)
            .map_err(|error| FetchError::io("failed to create download file", error))?;

        info!("Downloading {asset_name} from {url}");
        let downloaded = self.download(url, archive.path()).await?;
        info!("Download complete: {downloaded} bytes");

        extract_binary(
            archive.path(),
            asset_name,
            destination_dir,
            &self.binary_name,
            self.max_binary_size,
        )
    }
}

/// Fetcher used when upgrades are turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledArchiveFetcher;

#[async_trait]
impl ArchiveFetcher for DisabledArchiveFetcher {
    async fn download_and_extract(
        &self,
        _asset_name: &str,
        _destination_dir: &Path,
        _url: &str,
    ) -> Result<PathBuf, FetchError> {
        Err(FetchError::Disabled)
    }
}

/// Pull the binary called `binary_name` out of the archive at `archive`.
///
/// The format is chosen from `asset_name`. The binary is written to a fresh
/// file inside `destination_dir` and its path returned.
///
/// # Errors
/// Returns an error for unknown formats, unreadable archives, a missing or
/// oversized binary entry, or a failed write.
pub fn extract_binary(
    archive: &Path,
    asset_name: &str,
    destination_dir: &Path,
    binary_name: &str,
    max_binary_size: u64,
) -> Result<PathBuf, FetchError> {
    let extracted = match archive_kind(asset_name) {
        Some(ArchiveKind::TarGz) => {
            extract_from_tar_gz(archive, destination_dir, binary_name, max_binary_size)?
        }
        Some(ArchiveKind::Zip) => {
            extract_from_zip(archive, destination_dir, binary_name, max_binary_size)?
        }
        None => {
            return Err(FetchError::UnsupportedArchive {
                name: asset_name.to_string(),
            });
        }
    };

    extracted.ok_or_else(|| FetchError::BinaryNotFound {
        archive: asset_name.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    TarGz,
    Zip,
}

fn archive_kind(asset_name: &str) -> Option<ArchiveKind> {
    let path = Path::new(asset_name);
    let extension = path.extension()?;
    if extension.eq_ignore_ascii_case("zip") {
        Some(ArchiveKind::Zip)
    } else if extension.eq_ignore_ascii_case("tgz") {
        Some(ArchiveKind::TarGz)
    } else if extension.eq_ignore_ascii_case("gz")
        && Path::new(path.file_stem()?)
            .extension()
            .is_some_and(|inner| inner.eq_ignore_ascii_case("tar"))
    {
        Some(ArchiveKind::TarGz)
    } else {
        None
    }
}

fn is_binary_entry(path: &Path, binary_name: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            name == binary_name
                || name
                    .strip_suffix(".exe")
                    .is_some_and(|stem| stem == binary_name)
        })
}

fn extract_from_tar_gz(
    archive: &Path,
    destination_dir: &Path,
    binary_name: &str,
    max_binary_size: u64,
) -> Result<Option<PathBuf>, FetchError> {
    let file =
        File::open(archive).map_err(|error| FetchError::io("failed to open archive", error))?;
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let entries = tar
        .entries()
        .map_err(|error| FetchError::archive("failed to read tar archive", error))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|error| FetchError::archive("failed to read tar entry", error))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry
            .path()
            .map_err(|error| FetchError::archive("invalid tar entry path", error))?
            .into_owned();

        if is_binary_entry(&path, binary_name) {
            debug!("Found binary {} in tar archive", path.display());
            if entry.size() > max_binary_size {
                return Err(FetchError::TooLarge {
                    what: "binary",
                    limit: max_binary_size,
                });
            }
            return write_binary(&mut entry, destination_dir, max_binary_size).map(Some);
        }
    }

    Ok(None)
}

fn extract_from_zip(
    archive: &Path,
    destination_dir: &Path,
    binary_name: &str,
    max_binary_size: u64,
) -> Result<Option<PathBuf>, FetchError> {
    let file =
        File::open(archive).map_err(|error| FetchError::io("failed to open archive", error))?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|error| FetchError::archive("failed to read zip archive", error))?;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|error| FetchError::archive("failed to read zip entry", error))?;
        if entry.is_dir() {
            continue;
        }
        let Some(path) = entry.enclosed_name() else {
            warn!("Skipping zip entry with unsafe path");
            continue;
        };

        if is_binary_entry(&path, binary_name) {
            debug!("Found binary {} in zip archive", path.display());
            if entry.size() > max_binary_size {
                return Err(FetchError::TooLarge {
                    what: "binary",
                    limit: max_binary_size,
                });
            }
            return write_binary(&mut entry, destination_dir, max_binary_size).map(Some);
        }
    }

    Ok(None)
}

fn write_binary(
    reader: &mut impl Read,
    destination_dir: &Path,
    max_binary_size: u64,
) -> Result<PathBuf, FetchError> {
    let mut temp = tempfile::Builder::new()
        .prefix(".selfup-upgrade-")
        .tempfile_in(destination_dir)
        .map_err(|error| FetchError::io("failed to create extracted binary", error))?;

    // Sizes in archive headers can lie; cap what is actually written.
    let limit = max_binary_size.saturating_add(1);
    let written = std::io::copy(&mut reader.take(limit), &mut temp)
        .map_err(|error| FetchError::io("failed to extract binary", error))?;
    if written > max_binary_size {
        return Err(FetchError::TooLarge {
            what: "binary",
            limit: max_binary_size,
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o755))
            .map_err(|error| FetchError::io("failed to mark binary executable", error))?;
    }

    let (_, path) = temp
        .keep()
        .map_err(|error| FetchError::io("failed to keep extracted binary", error.error))?;
    Ok(path)
}
