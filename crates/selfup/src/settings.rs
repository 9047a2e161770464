use selfup_platform::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::Cli;

pub const DEFAULT_RELEASES_URL: &str = "https://api.github.com/repos/almeidx/selfup/releases";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_releases_url")]
    pub releases_url: String,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_binary_name")]
    pub binary_name: String,

    #[serde(default)]
    pub allow_prerelease: bool,

    #[serde(default = "default_true")]
    pub auto_upgrade: bool,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_max_archive_size_bytes")]
    pub max_archive_size_bytes: u64,

    #[serde(default = "default_max_binary_size_bytes")]
    pub max_binary_size_bytes: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_releases_url() -> String {
    DEFAULT_RELEASES_URL.to_string()
}

fn default_app_name() -> String {
    "selfup".to_string()
}

fn default_binary_name() -> String {
    "selfup".to_string()
}

fn default_true() -> bool {
    true
}

fn default_http_timeout() -> u64 {
    30
}

fn default_max_archive_size_bytes() -> u64 {
    selfup_github::DEFAULT_MAX_ARCHIVE_SIZE
}

fn default_max_binary_size_bytes() -> u64 {
    selfup_github::DEFAULT_MAX_BINARY_SIZE
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            releases_url: default_releases_url(),
            app_name: default_app_name(),
            binary_name: default_binary_name(),
            allow_prerelease: false,
            auto_upgrade: true,
            http_timeout_secs: default_http_timeout(),
            max_archive_size_bytes: default_max_archive_size_bytes(),
            max_binary_size_bytes: default_max_binary_size_bytes(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        let Ok(paths) = AppPaths::new() else {
            return Self::default();
        };
        Self::load_from(&paths.settings_file())
    }

    pub fn load_from(settings_path: &Path) -> Self {
        if !settings_path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(settings_path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        let paths = AppPaths::new().map_err(std::io::Error::other)?;
        paths.ensure_dirs()?;
        self.save_to(&paths.settings_file())
    }

    pub fn save_to(&self, settings_path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(settings_path, content)
    }

    /// Command-line flags win over stored values.
    #[must_use]
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if cli.prerelease {
            self.allow_prerelease = true;
        }
        if let Some(url) = &cli.releases_url {
            self.releases_url.clone_from(url);
        }
        if cli.debug {
            self.debug_logging = true;
        }
        self
    }
}
