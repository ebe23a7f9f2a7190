use crate::document::Document;
use crate::error::DocumentError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Exclusive claim on a page: at most one agent runs per page at a time.
///
/// Backed by a page-global flag so a second injection into the same page is
/// refused while this guard is held. Release is explicit because it talks to
/// the page.
pub struct InstanceGuard {
    document: Arc<dyn Document>,
    released: AtomicBool,
}

impl InstanceGuard {
    /// Claims the page. `Ok(None)` means another instance already holds it.
    pub async fn try_acquire(document: Arc<dyn Document>) -> Result<Option<Self>, DocumentError> {
        if !document.try_mark_active().await? {
            ::log::info!("Another scan is already active on this page");
            return Ok(None);
        }
        Ok(Some(Self {
            document,
            released: AtomicBool::new(false),
        }))
    }

    /// Gives the page back. Only the first call reaches the page.
    pub async fn release(&self) -> Result<(), DocumentError> {
        if self.released.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.document.clear_active().await
    }
}
