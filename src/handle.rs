use crate::instance::InstanceGuard;
use crate::pipeline::Pipeline;
use crate::progress::{EventSender, ScanCounters, ScanEvent, ScanProgress};
use crate::scheduler::{StateTx, stop_run};
use crate::state::{RunState, StopReason};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

/// Control surface of a running agent: the stop and close buttons, plus
/// read access to the counters.
pub struct AgentHandle {
    state: StateTx,
    pipeline: Pipeline,
    events: EventSender,
    guard: InstanceGuard,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl AgentHandle {
    pub(crate) fn new(
        state: StateTx,
        pipeline: Pipeline,
        events: EventSender,
        guard: InstanceGuard,
        scheduler: JoinHandle<()>,
    ) -> Self {
        Self {
            state,
            pipeline,
            events,
            guard,
            scheduler: Mutex::new(Some(scheduler)),
        }
    }

    /// Stops dispatching new posts. Submissions already in flight still
    /// resolve and update the counters. Pressing stop again does nothing.
    pub fn stop(&self) -> bool {
        stop_run(&self.state, StopReason::Manual, &self.pipeline, &self.events)
    }

    /// Tears the agent down: stops scanning, waits for the scan loop to
    /// exit and releases the page so a fresh agent can be injected.
    ///
    /// Terminal; returns false if the agent was already closed.
    pub async fn close(&self) -> bool {
        if !self.state.send_if_modified(|s| s.close()) {
            return false;
        }
        ::log::info!("Closing scan agent");

        if let Some(scheduler) = self.scheduler.lock().await.take() {
            if let Err(e) = scheduler.await {
                ::log::warn!("Scan loop ended abnormally: {}", e);
            }
        }
        if let Err(e) = self.guard.release().await {
            ::log::warn!("Failed to release page flag: {}", e);
        }

        self.events.publish(ScanEvent::Closed);
        true
    }

    pub fn run_state(&self) -> RunState {
        *self.state.borrow()
    }

    pub fn counters(&self) -> ScanCounters {
        self.pipeline.counters()
    }

    /// Banner state as it stands now
    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            counters: self.counters(),
            state: self.run_state(),
        }
    }

    /// Receiver that observes every counter change
    pub fn subscribe_counters(&self) -> watch::Receiver<ScanCounters> {
        self.pipeline.subscribe_counters()
    }

    /// Resolves once the run has left `Running`, returning the new state
    pub async fn wait_stopped(&self) -> RunState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|s| !s.is_running()).await {
            Ok(state) => *state,
            Err(_) => *self.state.borrow(),
        }
    }

    /// Resolves once no submission is in flight
    pub async fn wait_idle(&self) {
        self.pipeline.wait_idle().await
    }
}
