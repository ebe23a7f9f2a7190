use crate::parsers::text::normalize_text;
use scraper::{ElementRef, Html, Selector};

/// Attribute stamped on candidate roots in the live page. Its value is the
/// element's identity for the lifetime of the element: a re-rendered post is a
/// new element without it, a moved post keeps it.
pub const NODE_ID_ATTR: &str = "data-feed-scout-id";

/// Identity stamp of `element`, if the page has stamped it yet
pub fn node_id<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element
        .value()
        .attr(NODE_ID_ATTR)
        .filter(|id| !id.is_empty())
}

/// Finds the element carrying identity `id` in a parsed document
pub fn find_by_node_id<'a>(doc: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(&format!("[{NODE_ID_ATTR}=\"{id}\"]")).ok()?;
    doc.select(&selector).next()
}

/// Normalized text content of an element and all its descendants
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// `href` of the element itself or its nearest `<a>` ancestor
pub fn closest_link_href<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|e| e.value().name() == "a")
        .and_then(|a| a.value().attr("href"))
}

/// Normalized text of the first element matching `selector` that has any text
pub fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// The document `<title>`, if present and non-empty
pub fn document_title(doc: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    first_text(doc, &selector)
}
