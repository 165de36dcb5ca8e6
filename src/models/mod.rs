//! Data models for the acórdão crawler.

mod field;
mod record;

pub use field::{sanitize, Field, FieldSet};
pub use record::{CandidateRecord, ExtractionResult, PendingRecord};
