use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use fs2::FileExt;
use selfup_platform::AppPaths;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("another upgrade is already in progress")]
    AlreadyRunning,
    #[error("failed to resolve application paths: {0}")]
    Paths(#[from] selfup_platform::AppPathsError),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl AcquireError {
    fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}

/// Held for the duration of an upgrade so two processes never swap the same
/// binary at once. Released on drop.
pub struct UpgradeLock {
    _file: File,
}

impl UpgradeLock {
    pub fn acquire() -> Result<Self, AcquireError> {
        let paths = AppPaths::new()?;
        paths
            .ensure_dirs()
            .map_err(|error| AcquireError::io("failed to create app directories", error))?;
        Self::acquire_at(&paths.lock_file())
    }

    pub fn acquire_at(path: &Path) -> Result<Self, AcquireError> {
        let mut lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|error| AcquireError::io("failed to open upgrade lock file", error))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                return Err(AcquireError::AlreadyRunning);
            }
            Err(error) => {
                return Err(AcquireError::io("failed to acquire upgrade lock", error));
            }
        }

        lock_file
            .set_len(0)
            .and_then(|()| lock_file.seek(SeekFrom::Start(0)).map(|_| ()))
            .and_then(|()| writeln!(lock_file, "{}", std::process::id()))
            .map_err(|error| AcquireError::io("failed to write upgrade lock metadata", error))?;

        Ok(Self { _file: lock_file })
    }
}
