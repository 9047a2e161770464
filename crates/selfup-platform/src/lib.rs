mod naming;
mod paths;

pub use naming::{Platform, PlatformNaming};
pub use paths::{AppPaths, AppPathsError};
