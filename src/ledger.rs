use std::collections::HashSet;
use std::sync::Mutex;

/// Lifetime record of post texts that have already been claimed for submission.
///
/// Keyed purely on normalized text, never on node identity: a post that the
/// page re-renders somewhere else is still recognised as seen.
#[derive(Debug, Default)]
pub struct SeenLedger {
    seen: Mutex<HashSet<String>>,
}

impl SeenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `text` for submission.
    ///
    /// Returns true exactly once per distinct text; later calls return false
    /// and leave the ledger unchanged. This is the only write path.
    pub fn claim(&self, text: &str) -> bool {
        let mut seen = self.lock();
        if seen.contains(text) {
            ::log::trace!("Ledger already holds: {}", preview(text));
            return false;
        }
        seen.insert(text.to_string());
        true
    }

    /// Whether `text` has already been claimed
    pub fn contains(&self, text: &str) -> bool {
        self.lock().contains(text)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // Every write is a single insert, so a poisoned set is still consistent.
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Short prefix of a post for log lines
pub(crate) fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(40).collect();
    if text.chars().count() > 40 {
        out.push_str("...");
    }
    out
}
