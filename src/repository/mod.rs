//! Repository layer for the candidate table.
//!
//! A single synchronous rusqlite connection; statements are built with
//! sea-query so the configurable table name is quoted and every value is bound.

mod candidates;
pub mod util;

pub use candidates::{RecordStore, StoreCounts};

use thiserror::Error;

/// Column holding the record's unique identifier.
pub const URN_COLUMN: &str = "urn";
/// Column holding the source page URL.
pub const SOURCE_URL_COLUMN: &str = "url_lexml";
/// Column holding the completion flag.
pub const DOWNLOADED_COLUMN: &str = "was_downloaded";
/// Column holding the completion date.
pub const DOWNLOADED_AT_COLUMN: &str = "downloaded_at";
/// Column holding the year parsed from the URN.
pub const URN_YEAR_COLUMN: &str = "urn_year";

/// Date format of `downloaded_at`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised by the record store. All of them end the crawl.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Statement failed: {source}\n{sql}")]
    Statement {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("No record with urn {0}")]
    NoSuchRecord(String),
}
