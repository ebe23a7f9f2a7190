use serde::{Deserialize, Serialize};

/// Why a run left `Running`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The user pressed stop
    Manual,
    /// `scanned` reached the configured maximum
    CapReached,
    /// Too many consecutive ticks found nothing new
    Stale,
}

impl StopReason {
    /// Automatic stops are the designed end of a scan and are shown as "Done"
    pub fn is_automatic(self) -> bool {
        !matches!(self, StopReason::Manual)
    }
}

/// Lifecycle of one agent instance.
///
/// `Running` -> `Stopped` -> `Closed`, with `Running` -> `Closed` allowed
/// directly. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Running,
    Stopped(StopReason),
    Closed,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, RunState::Closed)
    }

    /// `Running -> Stopped(reason)`. Returns whether the state changed;
    /// stopping an already stopped or closed run is a no-op.
    pub fn stop(&mut self, reason: StopReason) -> bool {
        if self.is_running() {
            *self = RunState::Stopped(reason);
            true
        } else {
            false
        }
    }

    /// `Running | Stopped -> Closed`. Returns whether the state changed.
    pub fn close(&mut self) -> bool {
        if self.is_closed() {
            false
        } else {
            *self = RunState::Closed;
            true
        }
    }
}
