use crate::parsers::html::closest_link_href;
use crate::platforms::platform::{PlatformAdapter, group_name_from};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const TEXT_BLOCK: &str = r#"div[dir="auto"]"#;

/// Facebook group feeds.
///
/// Post bodies are rendered as `dir="auto"` text blocks. Blocks wrapped in a
/// link only count when the link targets a comment; every other link-wrapped
/// block is metadata (author names, group links, timestamps).
#[derive(Debug)]
pub struct FacebookAdapter {
    text_block: Selector,
    heading: Selector,
    banner_link: Selector,
    comment_link: Regex,
}

impl Default for FacebookAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FacebookAdapter {
    pub fn new() -> Self {
        Self {
            text_block: Selector::parse(TEXT_BLOCK).expect("static selector"),
            heading: Selector::parse("h1").expect("static selector"),
            banner_link: Selector::parse(r#"[role="banner"] a[href*="/groups/"]"#)
                .expect("static selector"),
            comment_link: Regex::new(r"(?i)(/comments?/|[?&]comment_id=)").expect("static regex"),
        }
    }
}

impl PlatformAdapter for FacebookAdapter {
    fn name(&self) -> &'static str {
        "facebook"
    }

    fn scan_path(&self) -> &'static str {
        "/api/fb-scan"
    }

    fn script_marker(&self) -> &'static str {
        "fb-scanner"
    }

    fn root_selector(&self) -> &'static str {
        TEXT_BLOCK
    }

    fn extract_candidate_roots<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        doc.select(&self.text_block).collect()
    }

    fn is_content_node(&self, node: ElementRef<'_>) -> bool {
        match closest_link_href(node) {
            Some(href) => self.comment_link.is_match(href),
            None => true,
        }
    }

    fn resolve_group_name(&self, doc: &Html) -> String {
        group_name_from(doc, &self.heading, &self.banner_link, "Facebook Group")
    }
}
