use crate::parsers::html::closest_link_href;
use crate::platforms::platform::{PlatformAdapter, group_name_from};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const TEXT_BLOCK: &str = r#"span[dir="ltr"]"#;

/// LinkedIn feeds and group pages.
#[derive(Debug)]
pub struct LinkedInAdapter {
    text_block: Selector,
    heading: Selector,
    banner_link: Selector,
    comment_link: Regex,
}

impl Default for LinkedInAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkedInAdapter {
    pub fn new() -> Self {
        Self {
            text_block: Selector::parse(TEXT_BLOCK).expect("static selector"),
            heading: Selector::parse("main h1").expect("static selector"),
            banner_link: Selector::parse(r#"[role="banner"] a[href*="/groups/"]"#)
                .expect("static selector"),
            comment_link: Regex::new(r"(?i)(commentUrn=|/comments?/)").expect("static regex"),
        }
    }
}

impl PlatformAdapter for LinkedInAdapter {
    fn name(&self) -> &'static str {
        "linkedin"
    }

    fn scan_path(&self) -> &'static str {
        "/api/li-scan"
    }

    fn script_marker(&self) -> &'static str {
        "li-scanner"
    }

    fn root_selector(&self) -> &'static str {
        TEXT_BLOCK
    }

    fn extract_candidate_roots<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        doc.select(&self.text_block).collect()
    }

    fn is_content_node(&self, node: ElementRef<'_>) -> bool {
        closest_link_href(node).is_none_or(|href| self.comment_link.is_match(href))
    }

    fn resolve_group_name(&self, doc: &Html) -> String {
        group_name_from(doc, &self.heading, &self.banner_link, "LinkedIn Feed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_text_roots() {
        let doc = Html::parse_document(
            r#"<body><div class="update-components-text"><span dir="ltr">We need a bookkeeper for Q3</span></div>
               <a href="/in/someone/"><span dir="ltr">Someone Person</span></a></body>"#,
        );
        let adapter = LinkedInAdapter::new();
        let roots = adapter.extract_candidate_roots(&doc);
        assert_eq!(roots.len(), 2);
        assert!(adapter.is_content_node(roots[0]));
        assert!(!adapter.is_content_node(roots[1]));
    }

    #[test]
    fn test_group_name_defaults() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert_eq!(LinkedInAdapter::new().resolve_group_name(&doc), "LinkedIn Feed");
    }
}
