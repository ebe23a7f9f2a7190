use crate::state::{RunState, StopReason};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Scan-wide counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanCounters {
    /// Candidates dispatched to the scoring endpoint
    pub scanned: usize,
    /// Submissions that came back as a match
    pub sent: usize,
    /// Submissions dispatched but not yet resolved
    pub pending: usize,
}

/// What the banner shows: the counters plus where the run is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub counters: ScanCounters,
    pub state: RunState,
}

impl fmt::Display for ScanProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counters;
        write!(f, "{} scanned, {} leads", c.scanned, c.sent)?;
        if c.pending > 0 {
            write!(f, " ({} checking...)", c.pending)?;
        }
        match self.state {
            RunState::Stopped(reason) if reason.is_automatic() => write!(f, " - Done"),
            RunState::Stopped(_) => write!(f, " - Stopped"),
            _ => Ok(()),
        }
    }
}

/// How one submission resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Matched,
    NotMatched,
    /// Network failure, error status or unreadable body. The lead is dropped.
    Failed,
}

/// Everything the agent reports to its UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Progress(ScanProgress),
    /// A submission resolved. Arrives in network order, not dispatch order.
    Resolved { text: String, outcome: Outcome },
    Stopped(StopReason),
    Closed,
}

/// Non-blocking publisher for `ScanEvent`s.
///
/// The agent never waits on its UI: when the channel is full or gone the
/// event is dropped and logged.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<ScanEvent>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<ScanEvent>) -> Self {
        Self { tx }
    }

    /// Creates a sender with a receiver holding up to `buffer` events
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<ScanEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(tx), rx)
    }

    pub fn publish(&self, event: ScanEvent) {
        if let Err(e) = self.tx.try_send(event) {
            ::log::warn!("Dropping scan event: {}", e);
        }
    }
}
