//! Field extraction from an acórdão detail page.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::links::extract_anchor_href;
use crate::models::{sanitize, ExtractionResult, Field};

/// Why a field could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLookup {
    /// The field has no element of its own.
    NoLocation,
    /// No element with the field's id on the page.
    Missing,
}

/// Element holding `field` on the page.
pub fn locate(document: &Html, field: Field) -> Result<ElementRef<'_>, FieldLookup> {
    let id = field.dom_id().ok_or(FieldLookup::NoLocation)?;
    let selector = Selector::parse(&format!("[id=\"{id}\"]")).map_err(|_| FieldLookup::Missing)?;
    document.select(&selector).next().ok_or(FieldLookup::Missing)
}

/// Rendered text of an element: whitespace runs collapse to one space, as a
/// browser lays the text out.
pub fn rendered_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull every schema field from a loaded detail page.
///
/// A missing element yields `None` for its field. The href companions are
/// only looked up under a base element that was found.
pub fn extract(document: &Html) -> ExtractionResult {
    let mut result = ExtractionResult::new();

    for field in Field::PRIMARY {
        match locate(document, field) {
            Ok(element) => {
                result.set(field, Some(sanitize(&rendered_text(element))));
                if let Some(companion) = field.href_companion() {
                    result.set(companion, extract_anchor_href(element).map(|h| sanitize(&h)));
                }
            }
            Err(lookup) => {
                debug!("{} not on page ({:?})", field, lookup);
                result.set(field, None);
                if let Some(companion) = field.href_companion() {
                    result.set(companion, None);
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    #[test]
    fn missing_fields_are_none() {
        let result = extract(&page("<p>vazio</p>"));
        for field in Field::ALL {
            assert_eq!(result.get(field), None, "{field}");
        }
        assert_eq!(result.fields().len(), Field::ALL.len());
    }

    #[test]
    fn reads_text_and_href_companions() {
        let document = page(
            r#"
            <div id="conteudo_numero_acordao"><a href="/acordao/2231">2231/2020</a></div>
            <div id="conteudo_relator">BENJAMIN
            ZYMLER</div>
            <div id="conteudo_numero_ata">32/2020 - Plenário</div>
            <div id="conteudo_assunto">Representação d'ofício</div>
            "#,
        );
        let result = extract(&document);

        assert_eq!(result.get(Field::DecisionNumber), Some("2231/2020"));
        assert_eq!(result.get(Field::DecisionNumberHref), Some("/acordao/2231"));
        assert_eq!(result.get(Field::Rapporteur), Some("BENJAMIN ZYMLER"));
        assert_eq!(result.get(Field::MinutesNumber), Some("32/2020 - Plenário"));
        assert_eq!(result.get(Field::MinutesNumberHref), None);
        assert_eq!(result.get(Field::Subject), Some("Representação d ofício"));
        assert_eq!(result.get(Field::Quorum), None);
    }

    #[test]
    fn indented_text_is_collapsed() {
        let document = page(
            "<div id=\"conteudo_acordao\">VISTOS, relatados e discutidos\n            estes autos.</div>\
             <div id=\"conteudo_voto\"><p>Acolho</p>\n\t<p>a   proposta.</p></div>",
        );
        let result = extract(&document);

        assert_eq!(
            result.get(Field::DecisionText),
            Some("VISTOS, relatados e discutidos estes autos.")
        );
        assert_eq!(result.get(Field::VoteText), Some("Acolho a proposta."));
    }

    #[test]
    fn href_companion_stays_none_without_base_element() {
        let document = page(r#"<a id="other" href="/ata/1">ata</a>"#);
        let result = extract(&document);
        assert_eq!(result.get(Field::MinutesNumber), None);
        assert_eq!(result.get(Field::MinutesNumberHref), None);
    }

    #[test]
    fn locate_rejects_companions() {
        let document = page("");
        assert_eq!(
            locate(&document, Field::DetailUrl).unwrap_err(),
            FieldLookup::NoLocation
        );
        assert_eq!(
            locate(&document, Field::Quorum).unwrap_err(),
            FieldLookup::Missing
        );
    }
}
