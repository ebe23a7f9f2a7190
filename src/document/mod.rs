//! The host page the agent is attached to.

pub mod webdriver;

pub use webdriver::WebDriverDocument;

use crate::error::DocumentError;
use async_trait::async_trait;
use url::Url;

/// Non-owning reference to an element of the host page.
///
/// Keyed on the identity stamp the page carries, not on position, so the
/// handle survives siblings coming and going. It goes stale once the page
/// removes or replaces the element, or recycles it for different text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    /// Value of the element's identity stamp
    pub id: String,
    /// Normalized text the element held when it was discovered
    pub text: String,
}

impl NodeHandle {
    pub fn new(id: impl Into<String>, text: String) -> Self {
        Self {
            id: id.into(),
            text,
        }
    }
}

/// Operations the agent performs on the live page.
///
/// The agent never edits page content. It touches the page only through the
/// identity stamps on candidate elements, the outline on matched posts and
/// the page-global activity flag.
#[async_trait]
pub trait Document: Send + Sync {
    /// Stamps every unstamped element matching `selector` with a fresh
    /// identity. Stamps already present are left alone.
    async fn stamp_nodes(&self, selector: &str) -> Result<(), DocumentError>;

    /// Serialized snapshot of the current DOM
    async fn source(&self) -> Result<String, DocumentError>;

    async fn current_url(&self) -> Result<Url, DocumentError>;

    /// Smoothly scrolls the page down by `pixels`
    async fn scroll_by(&self, pixels: u32) -> Result<(), DocumentError>;

    /// Outlines the element behind `node`.
    ///
    /// Returns `Ok(false)` without touching the page when the handle is stale.
    async fn outline(&self, node: &NodeHandle, style: &str) -> Result<bool, DocumentError>;

    /// Shows a blocking alert to the user
    async fn alert(&self, message: &str) -> Result<(), DocumentError>;

    /// Sets the page-global activity flag; false if it was already set
    async fn try_mark_active(&self) -> Result<bool, DocumentError>;

    /// Clears the page-global activity flag
    async fn clear_active(&self) -> Result<(), DocumentError>;
}
