mod error;
mod traits;
mod types;

pub use error::{FetchError, UpgradeError};
pub use traits::{
    ArchiveFetcher, NoopObserver, ReleaseNaming, ReleaseSource, UpgradeEvent, UpgradeObserver,
};
pub use types::{Asset, Release, VersionRelation};
