//! ghpm - install binaries from GitHub releases

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghpm_cli::cmd;
use ghpm_cli::{Cli, Commands, Settings};

/// Log file name inside the logs directory.
const LOG_FILE: &str = "ghpm.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env().map_err(anyhow::Error::msg)?;
    init_logging(&settings.layout.logs, cli.verbose);

    match cli.command {
        Commands::Install { name } => cmd::install::install(&settings, &name).await,
        Commands::Uninstall { name } => cmd::uninstall::uninstall(&settings, &name),
        Commands::List => cmd::list::list(&settings),
        Commands::Search { name } => cmd::search::search(&settings, &name).await,
        Commands::Info { name } => cmd::info::info(&settings, &name).await,
    }
}

/// Send logs to `<logs>/ghpm.log`, or stderr when that cannot be opened.
///
/// The filter comes from `GHPM_LOG`; without it the level is `info`, or
/// `debug` with `--verbose`.
fn init_logging(logs_dir: &Path, verbose: bool) {
    let filter = EnvFilter::try_from_env("GHPM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let file = std::fs::create_dir_all(logs_dir).and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(logs_dir.join(LOG_FILE))
    });

    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}
