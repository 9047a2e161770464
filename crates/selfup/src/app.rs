use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use selfup_backend::{ArchiveFetcher, Release, ReleaseNaming, ReleaseSource};
use selfup_core::{Installer, check_for_upgrade, running_binary};
use selfup_github::{DisabledArchiveFetcher, GitHubReleaseSource, HttpArchiveFetcher};
use selfup_platform::{AppPaths, PlatformNaming};

use crate::cli::Command;
use crate::error::AppError;
use crate::lock::UpgradeLock;
use crate::observer::LogObserver;
use crate::settings::Settings;

/// Version of this build, spelled as a release tag.
pub fn current_version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

pub async fn run(
    command: Command,
    settings: &Settings,
    binary: Option<PathBuf>,
) -> Result<(), AppError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.http_timeout_secs))
        .build()
        .map_err(AppError::HttpClient)?;
    let source = GitHubReleaseSource::new(
        client.clone(),
        &settings.releases_url,
        &settings.app_name,
    );
    let naming = PlatformNaming::current(&settings.app_name);
    let fetcher = archive_fetcher(settings, client);
    let current = current_version();
    debug!(
        "Running as {current} on {}, releases from {}",
        naming.platform(),
        settings.releases_url
    );

    match command {
        Command::Check => {
            match find_upgrade(&source, &current, settings, &naming).await? {
                Some(release) => println!("Upgrade available: {current} -> {}", release.tag),
                None => println!("{current} is up to date"),
            }
            Ok(())
        }
        Command::Upgrade => {
            let Some(release) = find_upgrade(&source, &current, settings, &naming).await? else {
                println!("{current} is up to date");
                return Ok(());
            };
            let _lock = UpgradeLock::acquire()?;
            let installer = Installer::new(fetcher.as_ref(), &naming, &LogObserver);
            let binary = match binary {
                Some(binary) => {
                    installer.upgrade_to(&binary, &release).await?;
                    binary
                }
                None => installer.upgrade_running_binary(&release).await?,
            };
            report_upgraded(&binary, &release.tag);
            Ok(())
        }
        Command::UpgradeUrl { url } => {
            let _lock = UpgradeLock::acquire()?;
            let installer = Installer::new(fetcher.as_ref(), &naming, &LogObserver);
            let binary = match binary {
                Some(binary) => binary,
                None => running_binary()?,
            };
            installer.upgrade_to_url(&binary, &url).await?;
            report_upgraded(&binary, &url);
            Ok(())
        }
        Command::Settings { save } => {
            if save {
                settings
                    .save()
                    .map_err(|error| AppError::settings("save", error))?;
            }
            if let Ok(paths) = AppPaths::new() {
                println!("# {}", paths.settings_file().display());
            }
            let rendered = serde_json::to_string_pretty(settings)
                .map_err(|error| AppError::settings("render", error.into()))?;
            println!("{rendered}");
            Ok(())
        }
    }
}

async fn find_upgrade(
    source: &dyn ReleaseSource,
    current: &str,
    settings: &Settings,
    naming: &dyn ReleaseNaming,
) -> Result<Option<Release>, AppError> {
    Ok(check_for_upgrade(
        source,
        current,
        settings.allow_prerelease,
        naming,
        &LogObserver,
    )
    .await?)
}

fn archive_fetcher(settings: &Settings, client: reqwest::Client) -> Box<dyn ArchiveFetcher> {
    if settings.auto_upgrade {
        Box::new(
            HttpArchiveFetcher::new(client, &settings.binary_name).with_limits(
                settings.max_archive_size_bytes,
                settings.max_binary_size_bytes,
            ),
        )
    } else {
        Box::new(DisabledArchiveFetcher)
    }
}

fn report_upgraded(binary: &Path, to: &str) {
    info!("Upgraded {} to {to}", binary.display());
    println!(
        "Upgraded {} to {to}; the previous binary is kept at {}",
        binary.display(),
        selfup_core::backup_path(binary).display()
    );
}
