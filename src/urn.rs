//! URN resolution from source page URLs.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// `scheme://www.<a>.<b>.<c>/<segment>/`; the URN is whatever follows.
static SOURCE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://www\.\w+\.\w+\.\w+/\w+/").unwrap());

static URN_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-\d{2}-\d{2}").unwrap());

/// The URL does not follow the source page pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No URN found in URL: {url}")]
pub struct ResolutionError {
    pub url: String,
}

/// Derive the canonical URN from a source page URL.
pub fn resolve(url: &str) -> Result<&str, ResolutionError> {
    SOURCE_PREFIX
        .find(url)
        .map(|m| &url[m.end()..])
        .ok_or_else(|| ResolutionError {
            url: url.to_string(),
        })
}

/// Year of the first `YYYY-MM-DD` date in a URN.
pub fn urn_year(urn: &str) -> Option<i32> {
    URN_DATE
        .captures(urn)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_text_after_path_segment() {
        assert_eq!(
            resolve("https://www.example.gov.br/norma/urn:lex:br:abc:2020-01-01;123"),
            Ok("urn:lex:br:abc:2020-01-01;123")
        );
        assert_eq!(
            resolve("http://www.lexml.gov.br/urn/urn:lex:br:tribunal.contas.uniao;plenario:acordao:2015-06-10;1423"),
            Ok("urn:lex:br:tribunal.contas.uniao;plenario:acordao:2015-06-10;1423")
        );
    }

    #[test]
    fn unmatched_url_is_an_error() {
        let err = resolve("https://lexml.gov.br/urn:lex:br:abc").unwrap_err();
        assert_eq!(err.url, "https://lexml.gov.br/urn:lex:br:abc");
        assert!(resolve("not a url").is_err());
    }

    #[test]
    fn year_comes_from_first_date() {
        assert_eq!(urn_year("urn:lex:br:abc:2012-11-21;2960"), Some(2012));
        assert_eq!(urn_year("urn:lex:br:abc;2960"), None);
    }
}
