pub mod facebook;
pub mod linkedin;
pub mod platform;

pub use facebook::FacebookAdapter;
pub use linkedin::LinkedInAdapter;
pub use platform::PlatformAdapter;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Supported host platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    #[default]
    Facebook,
    LinkedIn,
}

impl PlatformKind {
    /// Builds the adapter for this platform
    pub fn adapter(self) -> Arc<dyn PlatformAdapter> {
        match self {
            PlatformKind::Facebook => Arc::new(FacebookAdapter::new()),
            PlatformKind::LinkedIn => Arc::new(LinkedInAdapter::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_per_platform() {
        assert_eq!(PlatformKind::Facebook.adapter().scan_path(), "/api/fb-scan");
        assert_eq!(PlatformKind::LinkedIn.adapter().scan_path(), "/api/li-scan");
    }

    #[test]
    fn test_platform_names_in_config() {
        let kind: PlatformKind = serde_json::from_str("\"linkedin\"").unwrap();
        assert_eq!(kind, PlatformKind::LinkedIn);
    }
}
