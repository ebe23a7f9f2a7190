use crate::error::SettingsError;
use crate::extract::{MAX_POST_CHARS, MIN_POST_CHARS, TextBounds};
use crate::platforms::PlatformKind;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for a feed scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Host platform whose markup adapter is used
    #[serde(default)]
    pub platform: PlatformKind,

    /// Maximum number of posts dispatched before the scan stops itself
    #[serde(default = "default_max_posts")]
    pub max_posts: usize,

    /// Period between extraction passes, in milliseconds
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,

    /// Period between auto-scroll steps, in milliseconds
    #[serde(default = "default_scroll_interval_ms")]
    pub scroll_interval_ms: u64,

    /// Distance of one auto-scroll step, in pixels
    #[serde(default = "default_scroll_step_px")]
    pub scroll_step_px: u32,

    /// Consecutive empty scan ticks after which the scan stops itself
    #[serde(default = "default_stale_tick_limit")]
    pub stale_tick_limit: usize,

    /// Shortest accepted post, in characters
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Longest accepted post, in characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// CSS outline applied to matched posts
    #[serde(default = "default_highlight_style")]
    pub highlight_style: String,

    /// Capacity of the progress event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Optional per-request timeout for scoring calls, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            platform: PlatformKind::default(),
            max_posts: default_max_posts(),
            scan_interval_ms: default_scan_interval_ms(),
            scroll_interval_ms: default_scroll_interval_ms(),
            scroll_step_px: default_scroll_step_px(),
            stale_tick_limit: default_stale_tick_limit(),
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
            highlight_style: default_highlight_style(),
            event_buffer: default_event_buffer(),
            request_timeout_secs: None,
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings under which no run could find a post
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.stale_tick_limit == 0 {
            return Err(SettingsError::ZeroStaleTickLimit);
        }
        if self.min_chars > self.max_chars {
            return Err(SettingsError::InvertedTextBounds {
                min: self.min_chars,
                max: self.max_chars,
            });
        }
        if self.event_buffer == 0 {
            return Err(SettingsError::ZeroEventBuffer);
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms.max(1))
    }

    pub fn scroll_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn text_bounds(&self) -> TextBounds {
        TextBounds {
            min_chars: self.min_chars,
            max_chars: self.max_chars,
        }
    }
}

/// Default value for max_posts
fn default_max_posts() -> usize {
    500
}

/// Default value for scan_interval_ms
fn default_scan_interval_ms() -> u64 {
    2000
}

/// Default value for scroll_interval_ms
fn default_scroll_interval_ms() -> u64 {
    4000
}

fn default_scroll_step_px() -> u32 {
    800
}

/// Ten consecutive empty ticks
fn default_stale_tick_limit() -> usize {
    10
}

fn default_min_chars() -> usize {
    MIN_POST_CHARS
}

fn default_max_chars() -> usize {
    MAX_POST_CHARS
}

fn default_highlight_style() -> String {
    "3px solid #22c55e".to_string()
}

fn default_event_buffer() -> usize {
    1024
}
