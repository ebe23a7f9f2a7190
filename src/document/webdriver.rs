use crate::document::{Document, NodeHandle};
use crate::parsers::NODE_ID_ATTR;
use crate::error::DocumentError;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Value, json};
use url::Url;

/// Name of the window property used as the single-instance flag
const ACTIVE_FLAG: &str = "__feedScoutActive";

/// Page-global counter handing out identity stamps
const NEXT_ID: &str = "__feedScoutNextId";

const STAMP_JS: &str = r#"
const [selector, attr, counter] = arguments;
let next = window[counter] || 0;
for (const el of document.querySelectorAll(selector)) {
  if (!el.hasAttribute(attr)) el.setAttribute(attr, String(++next));
}
window[counter] = next;
return null;
"#;

/// Looks the element up by its stamp, checks it is still attached and still
/// carries the expected text, then applies the outline.
const OUTLINE_JS: &str = r#"
const [attr, id, expected, style] = arguments;
const el = document.querySelector('[' + attr + '="' + CSS.escape(id) + '"]');
if (!el || !el.isConnected) return false;
const text = (el.textContent || '').replace(/\s+/g, ' ').trim();
if (text !== expected) return false;
el.style.outline = style;
return true;
"#;

const SCROLL_JS: &str = "window.scrollBy({ top: arguments[0], behavior: 'smooth' }); return null;";

const ALERT_JS: &str = "window.alert(arguments[0]); return null;";

/// A page driven through a WebDriver session
#[derive(Clone)]
pub struct WebDriverDocument {
    client: Client,
}

impl WebDriverDocument {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connects to the WebDriver server and opens `url`
    pub async fn open(webdriver_url: &str, url: &str) -> Result<Self, DocumentError> {
        let client = ClientBuilder::native()
            .connect(webdriver_url)
            .await
            .map_err(|e| DocumentError::Connect {
                url: webdriver_url.to_string(),
                reason: e.to_string(),
            })?;
        ::log::debug!("Connected to WebDriver at {}", webdriver_url);

        client.goto(url).await?;
        ::log::info!("Opened {}", url);

        Ok(Self::new(client))
    }

    /// Ends the WebDriver session
    pub async fn close(self) -> Result<(), DocumentError> {
        self.client.close().await?;
        Ok(())
    }

    async fn execute_bool(&self, script: &str, args: Vec<Value>) -> Result<bool, DocumentError> {
        match self.client.execute(script, args).await? {
            Value::Bool(b) => Ok(b),
            other => Err(DocumentError::ScriptResult(format!(
                "expected a boolean, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl Document for WebDriverDocument {
    async fn stamp_nodes(&self, selector: &str) -> Result<(), DocumentError> {
        self.client
            .execute(STAMP_JS, vec![json!(selector), json!(NODE_ID_ATTR), json!(NEXT_ID)])
            .await?;
        Ok(())
    }

    async fn source(&self) -> Result<String, DocumentError> {
        Ok(self.client.source().await?)
    }

    async fn current_url(&self) -> Result<Url, DocumentError> {
        Ok(self.client.current_url().await?)
    }

    async fn scroll_by(&self, pixels: u32) -> Result<(), DocumentError> {
        self.client.execute(SCROLL_JS, vec![json!(pixels)]).await?;
        Ok(())
    }

    async fn outline(&self, node: &NodeHandle, style: &str) -> Result<bool, DocumentError> {
        self.execute_bool(
            OUTLINE_JS,
            vec![
                json!(NODE_ID_ATTR),
                json!(node.id),
                json!(node.text),
                json!(style),
            ],
        )
        .await
    }

    async fn alert(&self, message: &str) -> Result<(), DocumentError> {
        self.client.execute(ALERT_JS, vec![json!(message)]).await?;
        Ok(())
    }

    async fn try_mark_active(&self) -> Result<bool, DocumentError> {
        let script = format!(
            "if (window.{ACTIVE_FLAG}) return false; window.{ACTIVE_FLAG} = true; return true;"
        );
        self.execute_bool(&script, Vec::new()).await
    }

    async fn clear_active(&self) -> Result<(), DocumentError> {
        let script = format!("window.{ACTIVE_FLAG} = false; return null;");
        self.client.execute(&script, Vec::new()).await?;
        Ok(())
    }
}
