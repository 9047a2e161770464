use log::{debug, error, info, warn};
use selfup_backend::{UpgradeEvent, UpgradeObserver};

/// Forwards upgrade events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl UpgradeObserver for LogObserver {
    fn on_event(&self, event: &UpgradeEvent) {
        match event {
            UpgradeEvent::SkippedPrerelease { tag } => debug!("Skipping pre-release {tag}"),
            UpgradeEvent::NoMatchingAsset { tag } => {
                debug!("Release {tag} has no asset for this platform");
            }
            UpgradeEvent::Selected { tag } => debug!("Candidate release {tag}"),
            UpgradeEvent::DeferredMajor { selected, major } => {
                info!("Staying on {selected}; {major} is a major upgrade, run again to get it");
            }
            UpgradeEvent::ConsideringAsset { name } => debug!("Considering asset {name}"),
            UpgradeEvent::Downloading { asset, url } => info!("Downloading {asset} from {url}"),
            UpgradeEvent::StaleBackupNotRemoved { path, error } => {
                warn!("Could not remove old backup {}: {error}", path.display());
            }
            UpgradeEvent::MovedAside { from, to } => {
                debug!("Moved {} to {}", from.display(), to.display());
            }
            UpgradeEvent::Replaced { binary } => info!("Replaced {}", binary.display()),
            UpgradeEvent::RolledBack { binary, error } => {
                warn!("Upgrade of {} rolled back: {error}", binary.display());
            }
            UpgradeEvent::RollbackFailed { binary, error } => {
                error!(
                    "Rollback of {} failed, previous binary left at its .old path: {error}",
                    binary.display()
                );
            }
        }
    }
}
