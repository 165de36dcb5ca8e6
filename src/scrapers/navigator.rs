//! Navigation controller: drives the browser from each pending URN to its
//! detail pages and persists what it extracts.
//!
//! Per record the flow is:
//!
//! ```text
//! LoadSource -> AwaitPanel -> FilterLinks -> for each matching link:
//!     LoadTarget -> AwaitOverlay -> [DismissOverlay] -> Extract -> Merge -> Persist
//! ```
//!
//! Page interaction failures are logged and degrade the current step only.
//! Store failures, URN resolution failures and filter contract violations
//! end the run; the browser and the store are released either way.

use std::time::Duration;

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::driver::{wait_for, ElementState, LookupError, PageDriver};
use super::extract::extract;
use super::links::{outbound_href, select_interest_links, DomNode, TypeKindError};
use crate::config::DEFAULT_MARKER;
use crate::models::{ExtractionResult, PendingRecord};
use crate::repository::{RecordStore, StoreError};
use crate::urn::{self, ResolutionError};

/// Container listing a document's related publications.
pub const PANEL_SELECTOR: &str = ".panel-body";
/// Help popup shown over detail pages.
pub const HELP_OVERLAY_SELECTOR: &str = "body > app-root:nth-child(1) > ajuda:nth-child(3)";
/// Loading spinner that must disappear before the popup can be closed.
pub const SPINNER_SELECTOR: &str = ".tcu-spinner.ng-star-inserted";
/// Close control inside the help popup.
pub const OVERLAY_CLOSE_SELECTOR: &str =
    "body > app-root:nth-child(1) > ajuda:nth-child(3) .modal-close";

/// Wait and filter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorOptions {
    /// Upper bound for every wait.
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    /// Text identifying the panel entries to follow.
    pub marker: String,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

/// Errors that stop the crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    TypeKind(#[from] TypeKindError),
}

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Pending records taken up.
    pub records_seen: usize,
    /// Detail pages loaded.
    pub pages_visited: usize,
    /// Records written to the store.
    pub records_updated: usize,
    /// Records left pending.
    pub records_skipped: usize,
}

/// How one pending record ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrnOutcome {
    /// The source page could not be loaded.
    Unreachable,
    /// The related-publications panel never rendered.
    PanelTimeout,
    /// The panel had no entry matching the marker.
    NoMatches,
    /// Matching links were followed.
    Visited { pages: usize, persisted: usize },
}

/// What happened to the help popup on a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayOutcome {
    Absent,
    Dismissed,
    /// Present but left open after a wait or click failed.
    Skipped,
}

/// Sequential crawler over one browser tab and one store connection.
pub struct Navigator<D: PageDriver> {
    driver: D,
    store: RecordStore,
    options: NavigatorOptions,
}

impl<D: PageDriver> Navigator<D> {
    pub fn new(driver: D, store: RecordStore, options: NavigatorOptions) -> Self {
        Self {
            driver,
            store,
            options,
        }
    }

    /// Crawl the pending records, then close the browser and the store.
    ///
    /// Records are taken last-to-first from the pending query. `limit` caps
    /// how many are processed.
    pub async fn run(
        mut self,
        override_query: Option<&str>,
        limit: Option<usize>,
    ) -> Result<CrawlSummary, CrawlError> {
        let outcome = self.crawl(override_query, limit).await;
        let closed = self.shutdown().await;

        let summary = outcome?;
        closed?;
        info!(
            "Crawl finished: {} records, {} pages, {} updated, {} left pending",
            summary.records_seen,
            summary.pages_visited,
            summary.records_updated,
            summary.records_skipped
        );
        Ok(summary)
    }

    async fn crawl(
        &mut self,
        override_query: Option<&str>,
        limit: Option<usize>,
    ) -> Result<CrawlSummary, CrawlError> {
        let pending = self.store.fetch_pending(override_query)?;
        info!("{} records pending", pending.len());

        let mut summary = CrawlSummary::default();
        for record in pending.iter().rev().take(limit.unwrap_or(usize::MAX)) {
            summary.records_seen += 1;
            match self.process(record).await? {
                UrnOutcome::Visited { pages, persisted } => {
                    summary.pages_visited += pages;
                    if persisted > 0 {
                        summary.records_updated += 1;
                    } else {
                        summary.records_skipped += 1;
                    }
                }
                UrnOutcome::Unreachable | UrnOutcome::PanelTimeout | UrnOutcome::NoMatches => {
                    summary.records_skipped += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Run the full flow for one pending record.
    pub async fn process(&mut self, record: &PendingRecord) -> Result<UrnOutcome, CrawlError> {
        let source_url = record.source_url.as_str();

        debug!("Navigating to {}", source_url);
        if let Err(e) = self.driver.goto(source_url).await {
            warn!("Could not load {}: {}", source_url, e);
            return Ok(UrnOutcome::Unreachable);
        }

        if let Err(e) = self.wait(PANEL_SELECTOR, ElementState::Present).await {
            warn!("Related publications panel not found on {}: {}", source_url, e);
            return Ok(UrnOutcome::PanelTimeout);
        }

        let hrefs = self.interest_links(source_url).await?;
        if hrefs.is_empty() {
            info!("No tribunal links to follow on {}", source_url);
            return Ok(UrnOutcome::NoMatches);
        }
        if hrefs.len() > 1 {
            debug!("{} matching links on {}", hrefs.len(), source_url);
        }

        let mut pages = 0;
        let mut persisted = 0;
        for href in &hrefs {
            let Some(result) = self.visit_target(href).await else {
                continue;
            };
            pages += 1;

            let merged = result.merge(href, urn::resolve(source_url)?);
            let Some(urn) = merged.urn() else {
                continue;
            };
            self.store.apply_update(urn, merged.fields())?;
            persisted += 1;
            info!("Finished collecting {}", source_url);
        }

        Ok(UrnOutcome::Visited { pages, persisted })
    }

    /// Absolute hrefs of the panel entries matching the marker.
    async fn interest_links(&mut self, source_url: &str) -> Result<Vec<String>, CrawlError> {
        let html = match self.driver.content().await {
            Ok(html) => html,
            Err(e) => {
                warn!("Could not read {}: {}", source_url, e);
                return Ok(Vec::new());
            }
        };
        let base = match self.driver.current_url().await {
            Ok(url) => url,
            Err(e) => {
                debug!("Current URL unavailable, resolving against source: {}", e);
                source_url.to_string()
            }
        };
        Ok(interest_hrefs(&html, &base, &self.options.marker)?)
    }

    /// Load one detail page, clear the popup, and extract its fields.
    async fn visit_target(&mut self, href: &str) -> Option<ExtractionResult> {
        debug!("Following {}", href);
        if let Err(e) = self.driver.goto(href).await {
            warn!("Could not load {}: {}", href, e);
            return None;
        }

        let overlay = self.dismiss_overlay().await;
        debug!("Help overlay on {}: {:?}", href, overlay);

        match self.driver.content().await {
            Ok(html) => {
                let result = extract(&Html::parse_document(&html));
                debug!("{} fields found on {}", result.populated(), href);
                Some(result)
            }
            Err(e) => {
                warn!("Could not read {}: {}", href, e);
                None
            }
        }
    }

    /// Close the help popup if it shows up. Never fails.
    pub async fn dismiss_overlay(&mut self) -> OverlayOutcome {
        if let Err(e) = self.wait(HELP_OVERLAY_SELECTOR, ElementState::Visible).await {
            warn!("Help overlay not found on page: {}", e);
            return OverlayOutcome::Absent;
        }
        if let Err(e) = self.wait(SPINNER_SELECTOR, ElementState::Hidden).await {
            warn!("Loading spinner did not go away: {}", e);
            return OverlayOutcome::Skipped;
        }
        if let Err(e) = self.wait(OVERLAY_CLOSE_SELECTOR, ElementState::Visible).await {
            debug!("Help overlay close control not visible: {}", e);
            return OverlayOutcome::Skipped;
        }
        match self.driver.click(OVERLAY_CLOSE_SELECTOR).await {
            Ok(()) => OverlayOutcome::Dismissed,
            Err(e) => {
                warn!("Could not close help overlay: {}", e);
                OverlayOutcome::Skipped
            }
        }
    }

    async fn wait(&mut self, selector: &str, state: ElementState) -> Result<(), LookupError> {
        wait_for(
            &mut self.driver,
            selector,
            state,
            self.options.wait_timeout,
            self.options.poll_interval,
        )
        .await
    }

    async fn shutdown(mut self) -> Result<(), CrawlError> {
        if let Err(e) = self.driver.close().await {
            warn!("Browser did not close cleanly: {}", e);
        }
        self.store.close()?;
        Ok(())
    }
}

/// Outbound hrefs of the panel entries containing `marker`, resolved
/// against `base_url`. Entries without a usable link are skipped.
pub fn interest_hrefs(
    html: &str,
    base_url: &str,
    marker: &str,
) -> Result<Vec<String>, TypeKindError> {
    let document = Html::parse_document(html);
    let Ok(panel) = Selector::parse(PANEL_SELECTOR) else {
        return Ok(Vec::new());
    };
    let entries: Vec<DomNode<'_>> = document.select(&panel).map(DomNode::from).collect();

    let base = Url::parse(base_url).ok();
    let mut hrefs = Vec::new();
    for entry in select_interest_links(&entries, marker)? {
        let Some(href) = outbound_href(entry) else {
            warn!("Matching panel entry on {} has no link", base_url);
            continue;
        };
        match base.as_ref().map(|b| b.join(&href)) {
            Some(Ok(absolute)) => hrefs.push(absolute.to_string()),
            _ => hrefs.push(href),
        }
    }
    Ok(hrefs)
}
