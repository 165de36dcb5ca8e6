//! Browser seam used by the navigator.
//!
//! The navigator only needs a handful of primitives from a browser session:
//! navigate, check an element's state, click, and snapshot the DOM. Bounded
//! waits are built on top of `probe` by polling.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Condition an element can be waited for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// Attached to the DOM.
    Present,
    /// Attached and rendered.
    Visible,
    /// Absent or not rendered.
    Hidden,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        })
    }
}

/// A recoverable failure while interacting with the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Element not found: {selector}")]
    NotFound { selector: String },

    #[error("Timed out after {waited:?} waiting for {selector} to be {state}")]
    Timeout {
        selector: String,
        state: ElementState,
        waited: Duration,
    },

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Browser error: {0}")]
    Browser(String),
}

/// A single browser tab driven by the crawler.
#[async_trait]
pub trait PageDriver: Send {
    /// Load `url` in the tab.
    async fn goto(&mut self, url: &str) -> Result<(), LookupError>;

    /// URL of the currently loaded page.
    async fn current_url(&mut self) -> Result<String, LookupError>;

    /// Check, without waiting, whether `selector` is in `state`.
    async fn probe(&mut self, selector: &str, state: ElementState) -> Result<bool, LookupError>;

    /// Click the first element matching `selector`.
    async fn click(&mut self, selector: &str) -> Result<(), LookupError>;

    /// Serialized DOM of the current page.
    async fn content(&mut self) -> Result<String, LookupError>;

    /// Release the browser session.
    async fn close(&mut self) -> Result<(), LookupError>;
}

/// Poll until `selector` reaches `state` or `timeout` elapses.
pub async fn wait_for<D>(
    driver: &mut D,
    selector: &str,
    state: ElementState,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<(), LookupError>
where
    D: PageDriver + ?Sized,
{
    let started = Instant::now();
    loop {
        if driver.probe(selector, state).await? {
            debug!("{} is {} after {:?}", selector, state, started.elapsed());
            return Ok(());
        }
        let waited = started.elapsed();
        if waited >= timeout {
            return Err(LookupError::Timeout {
                selector: selector.to_string(),
                state,
                waited,
            });
        }
        tokio::time::sleep(poll_interval.min(timeout - waited)).await;
    }
}
