//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod crawl;
mod init;
mod resolve;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use acordaos::config::{Config, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "acordaos")]
#[command(about = "Crawl TCU acórdão detail pages into a SQLite table")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, global = true, env = "ACORDAOS_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the candidate table if it does not exist
    Init,

    /// Crawl pending records and store their acórdão fields
    Crawl {
        /// SQL selecting `urn, url_lexml` rows to crawl instead of the pending ones
        #[arg(long)]
        query: Option<String>,
        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show pending and downloaded counts
    Status,

    /// Print the URN derived from a source URL
    Resolve {
        /// Source page URL
        url: String,
    },
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init => init::cmd_init(&config),
        Commands::Crawl { query, limit } => crawl::cmd_crawl(&config, query.as_deref(), limit).await,
        Commands::Status => status::cmd_status(&config),
        Commands::Resolve { url } => resolve::cmd_resolve(&url),
    }
}
