use selfup_backend::ReleaseNaming;
use std::fmt;

/// Operating system and architecture, spelled the way release assets are named.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, release_arch(std::env::consts::ARCH))
    }

    /// Every OS spelling an asset for this platform may use.
    #[must_use]
    pub fn os_names(&self) -> Vec<&str> {
        match self.os.as_str() {
            "macos" => vec!["macos", "macosx"],
            os => vec![os],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

fn release_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        other => other,
    }
}

/// Default asset naming: `{app}-{os}-{arch}-{tag}.`
///
/// The trailing dot keeps `v1.1.0` from matching assets of `v1.1.0-rc.1` or
/// `v1.1.01`.
#[derive(Debug, Clone)]
pub struct PlatformNaming {
    app_name: String,
    platform: Platform,
}

impl PlatformNaming {
    #[must_use]
    pub fn new(app_name: impl Into<String>, platform: Platform) -> Self {
        Self {
            app_name: app_name.into(),
            platform,
        }
    }

    #[must_use]
    pub fn current(app_name: impl Into<String>) -> Self {
        Self::new(app_name, Platform::current())
    }

    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }
}

impl ReleaseNaming for PlatformNaming {
    fn release_names(&self, tag: &str) -> Vec<String> {
        self.platform
            .os_names()
            .into_iter()
            .map(|os| format!("{}-{os}-{}-{tag}.", self.app_name, self.platform.arch))
            .collect()
    }
}
