//! Helpers for reading page snapshots: text normalization and element addressing.

pub mod html;
pub mod text;

pub use html::{NODE_ID_ATTR, node_id};
pub use text::normalize_text;
