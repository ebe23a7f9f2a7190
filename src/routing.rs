use crate::error::ConfigError;
use scraper::{Html, Selector};
use url::Url;

/// Query parameter carrying the chat/routing identifier
pub const CHAT_ID_PARAM: &str = "cid";
/// Query parameter carrying the business identifier
pub const BUSINESS_ID_PARAM: &str = "bid";
/// Query parameter carrying the authorization token
pub const TOKEN_PARAM: &str = "tok";

/// Routing and auth parameters for one scan, derived once at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingConfig {
    pub chat_id: String,
    pub business_id: i64,
    pub token: String,
    /// Scoring endpoint: the script's own origin plus the platform scan path
    pub api_url: Url,
}

impl RoutingConfig {
    /// Build the routing config from the agent script URL.
    ///
    /// The endpoint host is never fixed: it is the origin the script was
    /// served from, so the same script works against any deployment.
    pub fn from_script_url(script_url: &str, scan_path: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(script_url).map_err(|e| ConfigError::InvalidScriptUrl {
            url: script_url.to_string(),
            reason: e.to_string(),
        })?;

        let chat_id = required_param(&url, CHAT_ID_PARAM)?;
        let raw_business_id = required_param(&url, BUSINESS_ID_PARAM)?;
        let token = required_param(&url, TOKEN_PARAM)?;

        let business_id = raw_business_id
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidBusinessId(raw_business_id.clone()))?;

        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(ConfigError::InvalidScriptUrl {
                url: script_url.to_string(),
                reason: "script URL has no origin".to_string(),
            });
        }
        let api_url = Url::parse(&origin.ascii_serialization())
            .and_then(|base| base.join(scan_path))
            .map_err(|e| ConfigError::InvalidScriptUrl {
                url: script_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            chat_id,
            business_id,
            token,
            api_url,
        })
    }

    /// Locate the agent's own `<script>` tag in a page snapshot and build
    /// the routing config from its `src`.
    ///
    /// Relative `src` values are resolved against `page_url` when one is given.
    pub fn resolve(
        html: &str,
        page_url: Option<&Url>,
        marker: &str,
        scan_path: &str,
    ) -> Result<Self, ConfigError> {
        let src = find_script_src(html, marker)
            .ok_or_else(|| ConfigError::ScriptNotFound(marker.to_string()))?;

        let absolute = match page_url {
            Some(base) => base
                .join(&src)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| src.clone()),
            None => src,
        };

        ::log::debug!("Resolved agent script URL: {}", absolute);
        Self::from_script_url(&absolute, scan_path)
    }
}

/// Returns the `src` of the first script element whose source contains `marker`
pub fn find_script_src(html: &str, marker: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("script[src]").ok()?;

    doc.select(&selector)
        .filter_map(|e| e.value().attr("src"))
        .find(|src| src.contains(marker))
        .map(|src| src.to_string())
}

fn required_param(url: &Url, name: &'static str) -> Result<String, ConfigError> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingParameter(name))
}
