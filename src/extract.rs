use crate::document::NodeHandle;
use crate::ledger::SeenLedger;
use crate::parsers::html::{element_text, node_id};
use crate::parsers::text::within_bounds;
use crate::platforms::PlatformAdapter;
use scraper::Html;

/// Shortest block that can be a post; anything shorter is a label or timestamp
pub const MIN_POST_CHARS: usize = 25;
/// Longest block accepted; anything longer is runaway concatenated text
pub const MAX_POST_CHARS: usize = 5000;

/// A discovered post not yet claimed for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub node: NodeHandle,
}

/// Inclusive length window for candidate text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBounds {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for TextBounds {
    fn default() -> Self {
        Self {
            min_chars: MIN_POST_CHARS,
            max_chars: MAX_POST_CHARS,
        }
    }
}

/// Everything one scan tick needs from a page snapshot.
///
/// Owned, so it can cross await points (a parsed `Html` cannot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPass {
    pub candidates: Vec<Candidate>,
    pub group_name: String,
}

/// Finds qualifying, unclaimed candidates in a parsed snapshot.
///
/// Rules, in order: length window, ledger, content-node check. Roots the
/// page has not stamped yet are left for the next pass. This is a pure read;
/// claiming is left to the submission pipeline.
pub fn extract_candidates(
    adapter: &dyn PlatformAdapter,
    doc: &Html,
    ledger: &SeenLedger,
    bounds: TextBounds,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for root in adapter.extract_candidate_roots(doc) {
        let text = element_text(root);

        if !within_bounds(&text, bounds.min_chars, bounds.max_chars) {
            continue;
        }
        if ledger.contains(&text) {
            continue;
        }
        if !adapter.is_content_node(root) {
            ::log::trace!("Skipping non-content block on {}", adapter.name());
            continue;
        }

        let Some(id) = node_id(root) else {
            ::log::trace!("Skipping unstamped block on {}", adapter.name());
            continue;
        };

        candidates.push(Candidate {
            node: NodeHandle::new(id, text.clone()),
            text,
        });
    }

    candidates
}

/// Parses a page source and reads one scan pass from it
pub fn read_pass(
    adapter: &dyn PlatformAdapter,
    html: &str,
    ledger: &SeenLedger,
    bounds: TextBounds,
) -> ScanPass {
    let doc = Html::parse_document(html);
    let candidates = extract_candidates(adapter, &doc, ledger, bounds);
    let group_name = adapter.resolve_group_name(&doc);

    ::log::debug!(
        "Extracted {} new candidates from {} ({})",
        candidates.len(),
        adapter.name(),
        group_name
    );

    ScanPass {
        candidates,
        group_name,
    }
}
