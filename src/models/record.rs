//! Candidate records and per-page extraction results.

use chrono::NaiveDate;

use super::field::{sanitize, Field, FieldSet};

/// A row of the candidate table.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    /// Canonical document identifier (unique).
    pub urn: String,
    /// Source page the crawl starts from (`url_lexml`).
    pub source_url: String,
    pub downloaded: bool,
    /// Set exactly when `downloaded` is true.
    pub downloaded_at: Option<NaiveDate>,
    pub fields: FieldSet,
}

impl CandidateRecord {
    pub fn field(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).and_then(|v| v.as_deref())
    }
}

/// A record still waiting to be crawled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    pub urn: String,
    pub source_url: String,
}

/// Fields pulled from one detail page.
///
/// Always carries every field of the schema; absent ones are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    fields: FieldSet,
    urn: Option<String>,
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self {
            fields: Field::ALL.into_iter().map(|f| (f, None)).collect(),
            urn: None,
        }
    }

    pub fn set(&mut self, field: Field, value: Option<String>) {
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).and_then(|v| v.as_deref())
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn urn(&self) -> Option<&str> {
        self.urn.as_deref()
    }

    /// Inject the followed href and the record's URN.
    pub fn merge(mut self, source_url: &str, urn: &str) -> Self {
        self.fields
            .insert(Field::DetailUrl, Some(sanitize(source_url)));
        self.urn = Some(urn.to_string());
        self
    }

    /// Number of fields holding a non-empty value.
    pub fn populated(&self) -> usize {
        self.fields
            .values()
            .filter(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_result_holds_every_key() {
        let result = ExtractionResult::new();
        assert_eq!(result.fields().len(), Field::ALL.len());
        assert!(result.fields().values().all(Option::is_none));
        assert_eq!(result.populated(), 0);
    }

    #[test]
    fn merge_injects_detail_url_and_urn() {
        let mut result = ExtractionResult::new();
        result.set(Field::Rapporteur, Some("AROLDO CEDRAZ".to_string()));

        let merged = result.merge("https://pesquisa.apps.tcu.gov.br/doc/1", "urn:lex:br:x");
        assert_eq!(
            merged.get(Field::DetailUrl),
            Some("https://pesquisa.apps.tcu.gov.br/doc/1")
        );
        assert_eq!(merged.urn(), Some("urn:lex:br:x"));
        assert_eq!(merged.populated(), 2);
    }
}
