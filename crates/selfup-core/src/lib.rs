//! Upgrade decision and binary replacement for a long-running executable.
//!
//! This crate holds the logic that is independent of how releases are
//! fetched or how archives are unpacked:
//! - Version tag comparison with major-boundary detection.
//! - Selection of the best release for the running platform.
//! - Replacement of a binary on disk with a rollback path.
//!
//! Diagnostics are reported through an injected
//! [`UpgradeObserver`](selfup_backend::UpgradeObserver); nothing here logs.

mod check;
mod install;
mod select;
mod version;

/// Fetch-then-select helpers and the "is this actually an upgrade" check.
pub use check::{check_for_upgrade, latest_release};
/// Binary download and swap with rollback.
pub use install::{Installer, backup_path, running_binary, swap_binary};
/// Release selection policy.
pub use select::select_latest_release;
/// Version tag parsing and comparison.
pub use version::{compare_versions, is_newer_version, parse_version};
