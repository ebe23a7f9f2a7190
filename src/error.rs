use thiserror::Error;

/// Problems with the routing parameters carried by the agent script URL.
///
/// All of these are fatal: the agent alerts the user and never starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no script tag matching '{0}' found on the page")]
    ScriptNotFound(String),

    #[error("invalid script URL '{url}': {reason}")]
    InvalidScriptUrl { url: String, reason: String },

    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("business id '{0}' is not an integer")]
    InvalidBusinessId(String),
}

impl ConfigError {
    /// Text shown in the blocking alert when the agent refuses to start.
    pub fn remediation(&self) -> String {
        format!(
            "Feed scanner could not start: {}. Copy the scanner link again from your dashboard and reload this page.",
            self
        )
    }
}

/// Scan settings that cannot produce a meaningful run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("stale_tick_limit must be at least 1")]
    ZeroStaleTickLimit,

    #[error("min_chars ({min}) is greater than max_chars ({max})")]
    InvertedTextBounds { min: usize, max: usize },

    #[error("event_buffer must be at least 1")]
    ZeroEventBuffer,
}

/// Failures talking to the host page.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to connect to WebDriver at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("unexpected script result: {0}")]
    ScriptResult(String),
}

/// Failures of a single scoring submission. Never retried.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("scoring endpoint returned status {status}")]
    Status { status: u16 },

    #[error("scoring endpoint returned a non-JSON body: {0}")]
    Decode(String),
}

/// Reasons `ScanAgent::start` declines to launch a scan.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("a scan is already active on this page")]
    AlreadyActive,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid scan settings: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
