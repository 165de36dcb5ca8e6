//! Browser-driven scraping of acórdão pages.

#[cfg(feature = "browser")]
pub mod browser;
pub mod driver;
pub mod extract;
pub mod links;
pub mod navigator;

#[cfg(feature = "browser")]
pub use browser::ChromeDriver;
pub use driver::{wait_for, ElementState, LookupError, PageDriver};
pub use extract::extract;
pub use links::{extract_anchor_href, outbound_href, select_interest_links, DomNode, TypeKindError};
pub use navigator::{
    CrawlError, CrawlSummary, Navigator, NavigatorOptions, OverlayOutcome, UrnOutcome,
};
