use crate::parsers::html::{document_title, first_text};
use scraper::{ElementRef, Html, Selector};

/// Markup knowledge for one social-network feed.
///
/// The extractor, pipeline and scheduler only ever talk to this interface;
/// every selector that depends on a host page's markup lives behind it.
pub trait PlatformAdapter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Path on the script origin that scores posts from this platform
    fn scan_path(&self) -> &'static str;

    /// Filename fragment identifying the agent's own script tag
    fn script_marker(&self) -> &'static str;

    /// CSS selector for elements that may hold authored post text
    fn root_selector(&self) -> &'static str;

    /// Elements that may hold authored post text, in document order
    fn extract_candidate_roots<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>>;

    /// Whether a candidate root is post body text rather than a UI affordance
    fn is_content_node(&self, node: ElementRef<'_>) -> bool;

    /// Best-effort name of the group or page being scanned
    fn resolve_group_name(&self, doc: &Html) -> String;
}

/// Heading, then banner link, then document title, then `fallback`
pub(crate) fn group_name_from(
    doc: &Html,
    heading: &Selector,
    banner_link: &Selector,
    fallback: &str,
) -> String {
    first_text(doc, heading)
        .or_else(|| first_text(doc, banner_link))
        .or_else(|| document_title(doc))
        .unwrap_or_else(|| fallback.to_string())
}
