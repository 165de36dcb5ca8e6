//! acordaos - crawl TCU acórdão detail pages into a SQLite table.

mod cli;

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use acordaos::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    let config = Config::load(&cli.config)?;

    init_logging(&config.log.dir, cli.verbose)?;

    cli::run(cli, config).await
}

/// Log to stderr and to a file per day under `log_dir`.
fn init_logging(log_dir: &Path, verbose: bool) -> anyhow::Result<()> {
    let default_filter = if verbose {
        "acordaos=debug"
    } else {
        "acordaos=info"
    };

    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join(format!(
        "{}_file.log",
        chrono::Local::now().format("%Y_%m_%d")
    ));
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    Ok(())
}
