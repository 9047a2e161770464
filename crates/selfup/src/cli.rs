use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "selfup",
    version,
    about = "Upgrade a binary in place from its published releases"
)]
pub struct Cli {
    /// Consider pre-releases when looking for an upgrade.
    #[arg(long, global = true)]
    pub prerelease: bool,

    /// Releases endpoint to query instead of the configured one.
    #[arg(long, global = true, env = "SELFUP_RELEASES_URL")]
    pub releases_url: Option<String>,

    /// Binary to replace instead of the running executable.
    #[arg(long, global = true)]
    pub binary: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report whether a newer release is available.
    Check,
    /// Replace the binary with the newest acceptable release.
    Upgrade,
    /// Replace the binary with the archive at a direct URL.
    UpgradeUrl { url: String },
    /// Print the effective settings and where they are stored.
    Settings {
        /// Write the effective settings back to the settings file.
        #[arg(long)]
        save: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Command};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_may_follow_subcommand() {
        let cli = Cli::parse_from(["selfup", "upgrade", "--binary", "/opt/tool/bin/tool"]);

        assert!(matches!(cli.command, Command::Upgrade));
        assert_eq!(
            cli.binary.as_deref(),
            Some(std::path::Path::new("/opt/tool/bin/tool"))
        );
    }

    #[test]
    fn upgrade_url_takes_positional_url() {
        let cli = Cli::parse_from([
            "selfup",
            "upgrade-url",
            "https://example.invalid/selfup-linux-amd64-v2.0.0.tar.gz",
        ]);

        assert!(matches!(
            cli.command,
            Command::UpgradeUrl { ref url } if url.ends_with("v2.0.0.tar.gz")
        ));
    }
}
