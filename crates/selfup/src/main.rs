mod app;
mod cli;
mod error;
mod lock;
mod logging;
mod observer;
mod settings;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::load().with_overrides(&cli);
    logging::init_logging(settings.debug_logging, settings.max_log_size_bytes);

    match app::run(cli.command, &settings, cli.binary).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error}");
            if let Some(hint) = error.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}
