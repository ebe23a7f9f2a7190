use crate::document::{Document, NodeHandle};
use crate::extract::Candidate;
use crate::ledger::{SeenLedger, preview};
use crate::progress::{EventSender, Outcome, ScanCounters, ScanEvent, ScanProgress};
use crate::routing::RoutingConfig;
use crate::scorer::{ScoreRequest, Scorer};
use crate::state::RunState;
use std::sync::Arc;
use tokio::sync::watch;

/// Page details attached to every submission from one scan tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub group_name: String,
    pub page_url: String,
}

/// Claims candidates, sends them for scoring and applies the verdicts.
///
/// Cheap to clone; all clones share the same ledger and counters.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<Inner>,
}

struct Inner {
    routing: RoutingConfig,
    scorer: Arc<dyn Scorer>,
    document: Arc<dyn Document>,
    ledger: SeenLedger,
    counters: watch::Sender<ScanCounters>,
    state: watch::Receiver<RunState>,
    events: EventSender,
    highlight_style: String,
}

impl Pipeline {
    pub fn new(
        routing: RoutingConfig,
        scorer: Arc<dyn Scorer>,
        document: Arc<dyn Document>,
        state: watch::Receiver<RunState>,
        events: EventSender,
        highlight_style: impl Into<String>,
    ) -> Self {
        let (counters, _) = watch::channel(ScanCounters::default());
        Self {
            inner: Arc::new(Inner {
                routing,
                scorer,
                document,
                ledger: SeenLedger::new(),
                counters,
                state,
                events,
                highlight_style: highlight_style.into(),
            }),
        }
    }

    /// Dispatches one candidate. Fire-and-forget: returns once the request
    /// is launched, not when it resolves.
    ///
    /// Returns false without side effects when the run is no longer
    /// `Running` or the text was already claimed.
    pub fn submit(&self, candidate: Candidate, context: &PageContext) -> bool {
        let inner = &self.inner;

        if !inner.state.borrow().is_running() {
            return false;
        }
        // Claim before anything asynchronous starts.
        if !inner.ledger.claim(&candidate.text) {
            return false;
        }

        inner.counters.send_modify(|c| {
            c.scanned += 1;
            c.pending += 1;
        });
        inner.publish_progress();

        let request = ScoreRequest {
            chat_id: inner.routing.chat_id.clone(),
            business_id: inner.routing.business_id,
            token: inner.routing.token.clone(),
            post_text: candidate.text.clone(),
            group_name: context.group_name.clone(),
            page_url: context.page_url.clone(),
        };

        ::log::debug!("Dispatching post: {}", preview(&candidate.text));

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.resolve(candidate, request).await;
        });

        true
    }

    pub fn ledger(&self) -> &SeenLedger {
        &self.inner.ledger
    }

    /// Current counters
    pub fn counters(&self) -> ScanCounters {
        *self.inner.counters.borrow()
    }

    /// Receiver that observes every counter change
    pub fn subscribe_counters(&self) -> watch::Receiver<ScanCounters> {
        self.inner.counters.subscribe()
    }

    /// Publishes the banner state as it stands now
    pub fn publish_progress(&self) {
        self.inner.publish_progress();
    }

    /// Resolves once no submission is in flight
    pub async fn wait_idle(&self) {
        let mut rx = self.subscribe_counters();
        let _ = rx.wait_for(|c| c.pending == 0).await;
    }
}

impl Inner {
    async fn resolve(&self, candidate: Candidate, request: ScoreRequest) {
        let outcome = match self.scorer.score(&self.routing.api_url, &request).await {
            Ok(resp) if resp.matched => Outcome::Matched,
            Ok(_) => Outcome::NotMatched,
            Err(e) => {
                // Dropped without retry.
                ::log::debug!("Submission failed for {}: {}", preview(&candidate.text), e);
                Outcome::Failed
            }
        };

        self.counters.send_modify(|c| {
            c.pending = c.pending.saturating_sub(1);
            if outcome == Outcome::Matched {
                c.sent += 1;
            }
        });

        if outcome == Outcome::Matched {
            ::log::info!("Lead matched: {}", preview(&candidate.text));
            self.highlight(&candidate.node).await;
        }

        self.events.publish(ScanEvent::Resolved {
            text: candidate.text,
            outcome,
        });
        self.publish_progress();
    }

    async fn highlight(&self, node: &NodeHandle) {
        match self.document.outline(node, &self.highlight_style).await {
            Ok(true) => {}
            Ok(false) => ::log::trace!("Matched post is no longer on the page"),
            Err(e) => ::log::debug!("Failed to outline matched post: {}", e),
        }
    }

    fn publish_progress(&self) {
        let progress = ScanProgress {
            counters: *self.counters.borrow(),
            state: *self.state.borrow(),
        };
        self.events.publish(ScanEvent::Progress(progress));
    }
}
