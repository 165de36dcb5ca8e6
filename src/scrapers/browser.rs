//! Chrome-backed page driver.
//!
//! Uses chromiumoxide (CDP) to run one headless tab. Element state checks
//! are evaluated in the page so waits see the live, rendered DOM.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::driver::{ElementState, LookupError, PageDriver};
use crate::config::DriverConfig;

/// Chrome session with a single tab.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeDriver {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Find the Chrome executable: configured path, then PATH, then known locations.
    fn find_chrome(configured: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = configured {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            anyhow::bail!("Configured browser not found: {}", path.display());
        }

        for cmd in [
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        for path in Self::CHROME_PATHS {
            let p = Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found. Install it or set [driver] driver in the config file"
        ))
    }

    /// Launch the browser and open the working tab.
    pub async fn launch(config: &DriverConfig) -> Result<Self> {
        let chrome_path = Self::find_chrome(config.driver.as_deref())?;
        info!("Launching browser (headless={})", config.headless);

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless
        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref log_path) = config.driver_logs {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create driver log directory {}", parent.display())
                })?;
            }
            builder = builder
                .arg("--enable-logging")
                .arg(format!("--log-file={}", log_path.display()));
        }

        builder = builder
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
            .arg("--disable-gpu");

        for arg in &config.args {
            builder = builder.arg(arg);
        }

        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open browser tab")?;

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

/// In-page check of an element's state.
fn probe_script(selector: &str, state: ElementState) -> String {
    // JSON string literals are valid JavaScript string literals.
    let selector = serde_json::Value::String(selector.to_string()).to_string();
    let state = serde_json::Value::String(state.to_string()).to_string();
    format!(
        r#"(() => {{
            const el = document.querySelector({selector});
            const state = {state};
            if (!el) return state === 'hidden';
            if (state === 'present') return true;
            const style = window.getComputedStyle(el);
            const shown = style.display !== 'none'
                && style.visibility !== 'hidden'
                && el.getClientRects().length > 0;
            return state === 'visible' ? shown : !shown;
        }})()"#
    )
}

fn browser_error(e: impl std::fmt::Display) -> LookupError {
    LookupError::Browser(e.to_string())
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn goto(&mut self, url: &str) -> Result<(), LookupError> {
        debug!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| LookupError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn current_url(&mut self) -> Result<String, LookupError> {
        self.page
            .url()
            .await
            .map_err(browser_error)?
            .ok_or_else(|| LookupError::Browser("page has no URL".to_string()))
    }

    async fn probe(&mut self, selector: &str, state: ElementState) -> Result<bool, LookupError> {
        self.page
            .evaluate(probe_script(selector, state))
            .await
            .map_err(browser_error)?
            .into_value::<bool>()
            .map_err(browser_error)
    }

    async fn click(&mut self, selector: &str) -> Result<(), LookupError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| LookupError::NotFound {
                selector: selector.to_string(),
            })?;
        element.click().await.map_err(browser_error)?;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, LookupError> {
        self.page.content().await.map_err(browser_error)
    }

    async fn close(&mut self) -> Result<(), LookupError> {
        let closed = self.browser.close().await.map(|_| ()).map_err(browser_error);
        if closed.is_ok() {
            let _ = self.browser.wait().await;
        }
        self.handler.abort();
        closed
    }
}
