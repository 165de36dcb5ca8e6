//! Related-publications link filtering.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use thiserror::Error;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Class carried by the printable-hidden link of a panel entry.
pub const AUXILIARY_LINK_CLASS: &str = "noprint";

static AUXILIARY_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(&format!(".{AUXILIARY_LINK_CLASS}")).unwrap());

/// A DOM node handed to the link filter.
#[derive(Debug, Clone, Copy)]
pub enum DomNode<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
    Comment(&'a str),
    Other,
}

impl<'a> DomNode<'a> {
    /// Direct children of `parent`, elements and non-elements alike.
    #[cfg(test)]
    pub fn children_of(parent: ElementRef<'a>) -> Vec<DomNode<'a>> {
        use scraper::Node;

        parent
            .children()
            .map(|child| match child.value() {
                Node::Element(_) => ElementRef::wrap(child).map_or(DomNode::Other, DomNode::Element),
                Node::Text(text) => DomNode::Text(text),
                Node::Comment(comment) => DomNode::Comment(comment),
                _ => DomNode::Other,
            })
            .collect()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Element(_) => "element",
            Self::Text(_) => "text",
            Self::Comment(_) => "comment",
            Self::Other => "other",
        }
    }
}

impl<'a> From<ElementRef<'a>> for DomNode<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        DomNode::Element(element)
    }
}

/// A non-element node reached the link filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected element nodes, got a {kind} node at position {index}")]
pub struct TypeKindError {
    pub index: usize,
    pub kind: &'static str,
}

/// Elements whose text contains `marker`, in document order.
///
/// Every node must be an element; the check runs before any filtering.
pub fn select_interest_links<'a>(
    nodes: &[DomNode<'a>],
    marker: &str,
) -> Result<Vec<ElementRef<'a>>, TypeKindError> {
    let elements = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| match node {
            DomNode::Element(element) => Ok(*element),
            other => Err(TypeKindError {
                index,
                kind: other.kind(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(elements
        .into_iter()
        .filter(|element| element.text().collect::<String>().contains(marker))
        .collect())
}

/// `href` of the first anchor under `element` (the element itself included).
///
/// Only the first anchor is consulted; a missing or empty attribute yields `None`.
pub fn extract_anchor_href(element: ElementRef<'_>) -> Option<String> {
    let anchor = if element.value().name() == "a" {
        element
    } else {
        element.select(&ANCHOR).next()?
    };
    anchor
        .value()
        .attr("href")
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}

/// The href a matching panel entry points to.
///
/// Taken from the first descendant carrying the auxiliary link class, not
/// from the first anchor of the entry.
pub fn outbound_href(entry: ElementRef<'_>) -> Option<String> {
    entry
        .select(&AUXILIARY_LINK)
        .next()
        .and_then(extract_anchor_href)
}
