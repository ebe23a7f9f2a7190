use crate::config::ScanConfig;
use crate::document::Document;
use crate::extract::{TextBounds, read_pass};
use crate::pipeline::{PageContext, Pipeline};
use crate::platforms::PlatformAdapter;
use crate::progress::{EventSender, ScanEvent};
use crate::state::{RunState, StopReason};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Shared run state: one sender, observed by the scheduler, the scroll
/// loop, the pipeline and the control handle.
pub type StateTx = Arc<watch::Sender<RunState>>;

/// Moves the run to `Stopped(reason)` and announces it.
///
/// Returns false when the run had already left `Running`.
pub(crate) fn stop_run(
    state: &StateTx,
    reason: StopReason,
    pipeline: &Pipeline,
    events: &EventSender,
) -> bool {
    if !state.send_if_modified(|s| s.stop(reason)) {
        return false;
    }

    let counters = pipeline.counters();
    ::log::info!(
        "Scan stopped ({:?}): {} scanned, {} leads, {} pending",
        reason,
        counters.scanned,
        counters.sent,
        counters.pending
    );
    events.publish(ScanEvent::Stopped(reason));
    pipeline.publish_progress();
    true
}

/// Timing and termination settings for the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub scan_interval: Duration,
    pub scroll_interval: Duration,
    pub scroll_step_px: u32,
    pub max_posts: usize,
    pub stale_tick_limit: usize,
    pub bounds: TextBounds,
}

impl From<&ScanConfig> for SchedulerSettings {
    fn from(config: &ScanConfig) -> Self {
        Self {
            scan_interval: config.scan_interval(),
            scroll_interval: config.scroll_interval(),
            scroll_step_px: config.scroll_step_px,
            max_posts: config.max_posts,
            stale_tick_limit: config.stale_tick_limit,
            bounds: config.text_bounds(),
        }
    }
}

/// Result of a single scan tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep ticking
    Continue,
    /// The run is no longer `Running`
    Finished,
}

/// Drives extraction on a fixed period and owns the termination policy.
pub struct Scheduler {
    document: Arc<dyn Document>,
    adapter: Arc<dyn PlatformAdapter>,
    pipeline: Pipeline,
    state: StateTx,
    events: EventSender,
    settings: SchedulerSettings,
    stale_ticks: usize,
}

impl Scheduler {
    pub fn new(
        document: Arc<dyn Document>,
        adapter: Arc<dyn PlatformAdapter>,
        pipeline: Pipeline,
        state: StateTx,
        events: EventSender,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            document,
            adapter,
            pipeline,
            state,
            events,
            settings,
            stale_ticks: 0,
        }
    }

    /// Consecutive ticks that found nothing new
    pub fn stale_ticks(&self) -> usize {
        self.stale_ticks
    }

    /// Runs scan ticks until the run leaves `Running`, alongside a scroll
    /// loop on its own period.
    pub async fn run(mut self) {
        ::log::info!(
            "Scanning {} every {:?}, scrolling every {:?}",
            self.adapter.name(),
            self.settings.scan_interval,
            self.settings.scroll_interval
        );

        let scroll = tokio::spawn(scroll_loop(
            Arc::clone(&self.document),
            self.state.subscribe(),
            self.settings.scroll_interval,
            self.settings.scroll_step_px,
        ));

        let mut state_rx = self.state.subscribe();
        let mut ticker = tokio::time::interval(self.settings.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.tick().await == TickOutcome::Finished {
                        break;
                    }
                }
                changed = state_rx.changed() => {
                    if changed.is_err() || !state_rx.borrow().is_running() {
                        break;
                    }
                }
            }
        }

        ::log::debug!("Scan loop finished");
        if let Err(e) = scroll.await {
            ::log::warn!("Scroll loop ended abnormally: {}", e);
        }
    }

    /// One scan tick: snapshot, extract, submit, then apply the
    /// termination rules.
    pub async fn tick(&mut self) -> TickOutcome {
        if !self.state.borrow().is_running() {
            return TickOutcome::Finished;
        }

        if let Err(e) = self.document.stamp_nodes(self.adapter.root_selector()).await {
            ::log::debug!("Failed to stamp candidate blocks: {}", e);
        }

        let html = match self.document.source().await {
            Ok(html) => html,
            Err(e) => {
                ::log::warn!("Failed to read page snapshot: {}", e);
                String::new()
            }
        };

        let pass = read_pass(
            self.adapter.as_ref(),
            &html,
            self.pipeline.ledger(),
            self.settings.bounds,
        );

        if pass.candidates.is_empty() {
            self.stale_ticks += 1;
            ::log::debug!(
                "No new posts ({}/{} empty ticks)",
                self.stale_ticks,
                self.settings.stale_tick_limit
            );
        } else {
            self.stale_ticks = 0;

            let page_url = match self.document.current_url().await {
                Ok(url) => url.to_string(),
                Err(e) => {
                    ::log::debug!("Failed to read page URL: {}", e);
                    String::new()
                }
            };
            let context = PageContext {
                group_name: pass.group_name,
                page_url,
            };

            for candidate in pass.candidates {
                if self.pipeline.counters().scanned >= self.settings.max_posts {
                    break;
                }
                self.pipeline.submit(candidate, &context);
            }
        }

        if self.pipeline.counters().scanned >= self.settings.max_posts {
            stop_run(&self.state, StopReason::CapReached, &self.pipeline, &self.events);
        } else if self.stale_ticks >= self.settings.stale_tick_limit {
            stop_run(&self.state, StopReason::Stale, &self.pipeline, &self.events);
        }

        if self.state.borrow().is_running() {
            TickOutcome::Continue
        } else {
            TickOutcome::Finished
        }
    }
}

/// Scrolls the page on its own period. Checks the run state before each
/// step and ends itself once the run has left `Running`.
async fn scroll_loop(
    document: Arc<dyn Document>,
    state: watch::Receiver<RunState>,
    interval: Duration,
    step_px: u32,
) {
    loop {
        tokio::time::sleep(interval).await;
        if !state.borrow().is_running() {
            break;
        }
        if let Err(e) = document.scroll_by(step_px).await {
            ::log::debug!("Auto-scroll failed: {}", e);
        }
    }
    ::log::debug!("Scroll loop finished");
}
