//! Configuration for the acórdão crawler.
//!
//! Loaded once at startup from a TOML file and passed by reference to the
//! store and the navigator.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::scrapers::NavigatorOptions;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Panel entry text identifying the tribunal's own HTML publication.
pub const DEFAULT_MARKER: &str = "Tribunal de Contas da União (text/html)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// `[db]` group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// SQLite database file.
    pub name: PathBuf,
    #[serde(default = "default_table")]
    pub tablename: String,
}

/// `[driver]` group: the controlled browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Browser executable. Discovered on PATH when unset.
    #[serde(default)]
    pub driver: Option<PathBuf>,
    /// File receiving the browser's own log output.
    #[serde(default)]
    pub driver_logs: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub headless: bool,
    /// Extra browser command-line flags.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            driver: None,
            driver_logs: None,
            headless: true,
            args: Vec::new(),
        }
    }
}

/// `[crawl]` group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Upper bound for every wait on the page, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            marker: default_marker(),
        }
    }
}

/// `[log]` group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
        }
    }
}

fn default_table() -> String {
    "download_acordaos".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

impl Config {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Wait and filter settings for the navigator.
    pub fn crawl_options(&self) -> NavigatorOptions {
        NavigatorOptions {
            wait_timeout: Duration::from_secs(self.crawl.timeout_secs),
            poll_interval: Duration::from_millis(self.crawl.poll_interval_ms.max(1)),
            marker: self.crawl.marker.clone(),
        }
    }
}
