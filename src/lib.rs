//! Feed-scanning agent: discovers posts on a social feed as it scrolls,
//! sends each new post once for lead scoring and outlines the matches.

pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod handle;
pub mod instance;
pub mod ledger;
pub mod parsers;
pub mod pipeline;
pub mod platforms;
pub mod progress;
pub mod routing;
pub mod scheduler;
pub mod scorer;
pub mod state;

#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use config::ScanConfig;
pub use document::{Document, WebDriverDocument};
pub use error::{ConfigError, SettingsError, StartError};
pub use handle::AgentHandle;
pub use progress::{ScanEvent, ScanProgress};
pub use routing::RoutingConfig;
pub use scorer::{HttpScorer, Scorer};
pub use state::{RunState, StopReason};

use instance::InstanceGuard;
use pipeline::Pipeline;
use platforms::PlatformAdapter;
use progress::EventSender;
use scheduler::{Scheduler, SchedulerSettings};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Where the routing parameters come from
#[derive(Debug, Clone)]
pub enum RoutingSource {
    /// The agent's own `<script>` tag on the page
    PageScript,
    /// An explicit script URL carrying `cid`, `bid` and `tok`
    ScriptUrl(String),
    /// Already resolved
    Resolved(RoutingConfig),
}

/// Builder for a scan agent attached to one page
pub struct ScanAgent {
    document: Arc<dyn Document>,
    scorer: Arc<dyn Scorer>,
    adapter: Option<Arc<dyn PlatformAdapter>>,
    routing: RoutingSource,
    config: ScanConfig,
}

impl ScanAgent {
    /// Create a new agent for `document`, scoring posts with `scorer`
    pub fn new(document: Arc<dyn Document>, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            document,
            scorer,
            adapter: None,
            routing: RoutingSource::PageScript,
            config: ScanConfig::default(),
        }
    }

    /// Apply a configuration
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(
        self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = ScanConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Use a specific platform adapter instead of the configured platform's
    pub fn with_adapter(mut self, adapter: Arc<dyn PlatformAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Read routing parameters from an explicit script URL
    pub fn with_script_url(mut self, script_url: impl Into<String>) -> Self {
        self.routing = RoutingSource::ScriptUrl(script_url.into());
        self
    }

    /// Use already-resolved routing parameters
    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = RoutingSource::Resolved(routing);
        self
    }

    /// Override the maximum number of posts dispatched
    pub fn with_max_posts(mut self, max_posts: usize) -> Self {
        self.config.max_posts = max_posts;
        self
    }

    /// Claims the page, resolves routing and starts scanning.
    ///
    /// On a routing error the user gets a blocking alert and nothing is
    /// started: no timers, no requests, and the page claim is given back.
    pub async fn start(self) -> Result<(AgentHandle, mpsc::Receiver<ScanEvent>), StartError> {
        self.config.validate()?;

        let adapter = self
            .adapter
            .unwrap_or_else(|| self.config.platform.adapter());

        let guard = InstanceGuard::try_acquire(Arc::clone(&self.document))
            .await?
            .ok_or(StartError::AlreadyActive)?;

        let routing = match resolve_routing(&self.routing, self.document.as_ref(), adapter.as_ref()).await {
            Ok(routing) => routing,
            Err(e) => {
                if let StartError::Config(ref config_err) = e {
                    ::log::error!("Refusing to start: {}", config_err);
                    if let Err(alert_err) = self.document.alert(&config_err.remediation()).await {
                        ::log::warn!("Failed to show alert: {}", alert_err);
                    }
                }
                if let Err(release_err) = guard.release().await {
                    ::log::warn!("Failed to release page flag: {}", release_err);
                }
                return Err(e);
            }
        };

        ::log::info!(
            "Starting {} scan for business {} -> {}",
            adapter.name(),
            routing.business_id,
            routing.api_url
        );

        let state = Arc::new(watch::channel(RunState::Running).0);
        let (events, rx) = EventSender::channel(self.config.event_buffer);

        let pipeline = Pipeline::new(
            routing,
            self.scorer,
            Arc::clone(&self.document),
            state.subscribe(),
            events.clone(),
            self.config.highlight_style.clone(),
        );
        pipeline.publish_progress();

        let scheduler = Scheduler::new(
            Arc::clone(&self.document),
            adapter,
            pipeline.clone(),
            Arc::clone(&state),
            events.clone(),
            SchedulerSettings::from(&self.config),
        );
        let task = tokio::spawn(scheduler.run());

        Ok((AgentHandle::new(state, pipeline, events, guard, task), rx))
    }
}

async fn resolve_routing(
    source: &RoutingSource,
    document: &dyn Document,
    adapter: &dyn PlatformAdapter,
) -> Result<RoutingConfig, StartError> {
    match source {
        RoutingSource::Resolved(routing) => Ok(routing.clone()),
        RoutingSource::ScriptUrl(url) => Ok(RoutingConfig::from_script_url(url, adapter.scan_path())?),
        RoutingSource::PageScript => {
            let html = document.source().await?;
            let page_url = document.current_url().await.ok();
            Ok(RoutingConfig::resolve(
                &html,
                page_url.as_ref(),
                adapter.script_marker(),
                adapter.scan_path(),
            )?)
        }
    }
}
