//! acordaos - resumable crawler for TCU acórdão detail pages.
//!
//! Walks the pending records of a candidate table, follows each record's
//! related-publications panel to the tribunal's own detail page, extracts the
//! decision fields and marks the record downloaded.

pub mod config;
pub mod models;
pub mod repository;
pub mod scrapers;
pub mod urn;
