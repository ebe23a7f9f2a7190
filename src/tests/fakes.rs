//! In-memory stand-ins for the page and the scoring endpoint.

use crate::document::{Document, NodeHandle};
use crate::error::{DocumentError, SubmitError};
use crate::parsers::NODE_ID_ATTR;
use crate::parsers::html::{element_text, find_by_node_id};
use crate::progress::ScanEvent;
use crate::routing::RoutingConfig;
use crate::scorer::{ScoreRequest, ScoreResponse, Scorer};
use async_trait::async_trait;
use scraper::Html;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use url::Url;

pub const PAGE_URL: &str = "https://www.facebook.com/groups/austin-homeowners";
pub const SCRIPT_URL: &str = "https://app.example.com/static/fb-scanner.js?cid=chat-1&bid=9&tok=tk";

pub const POST_A: &str = "Need a plumber this week, our water heater just died";
pub const POST_B: &str = "Can anyone recommend a landscaper for a small backyard?";
pub const POST_C: &str = "Selling a gently used stroller, message me if interested";
pub const POST_D: &str = "Looking for a plumber who can install a new dishwasher";
pub const POST_E: &str = "Does anyone know when the community pool opens this year?";

/// A feed page carrying the scanner script tag, a heading and the given posts
pub fn feed_html(posts: &[&str]) -> String {
    feed_html_with_script(SCRIPT_URL, posts)
}

pub fn feed_html_with_script(script_url: &str, posts: &[&str]) -> String {
    let body: String = posts.iter().map(|p| post_block(p)).collect();
    format!(
        "<html><head><title>Facebook</title><script src=\"{script_url}\"></script></head>\
         <body><h1>Austin Homeowners</h1>{body}</body></html>"
    )
}

/// One post as the feed renders it: the body block plus a "Like" button
pub fn post_block(text: &str) -> String {
    format!("<div class=\"post\"><div dir=\"auto\">{text}</div><div dir=\"auto\">Like</div></div>")
}

const AD_BLOCK: &str = "<div class=\"ad\">Sponsored</div>";

/// Puts a sponsored card at the top of the feed
pub fn with_ad(html: &str) -> String {
    html.replacen("</h1>", &format!("</h1>{AD_BLOCK}"), 1)
}

pub fn without_ad(html: &str) -> String {
    html.replacen(AD_BLOCK, "", 1)
}

/// Removes the whole post block holding `text`, stamps and all
pub fn without_post(html: &str, text: &str) -> String {
    let at = html.find(text).unwrap();
    let start = html[..at].rfind("<div class=\"post\">").unwrap();
    let end = at + html[at..].find("</div></div>").unwrap() + "</div></div>".len();
    format!("{}{}", &html[..start], &html[end..])
}

/// Adds posts at the bottom of the feed, leaving existing elements alone
pub fn appended(html: &str, posts: &[&str]) -> String {
    let extra: String = posts.iter().map(|p| post_block(p)).collect();
    html.replacen("</body>", &format!("{extra}</body>"), 1)
}

pub fn routing() -> RoutingConfig {
    RoutingConfig::from_script_url(SCRIPT_URL, "/api/fb-scan").unwrap()
}

pub fn drain(rx: &mut mpsc::Receiver<ScanEvent>) -> Vec<ScanEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Page whose HTML the test can swap between ticks
pub struct FakeDocument {
    html: Mutex<String>,
    url: Url,
    sources: AtomicUsize,
    next_id: AtomicUsize,
    scrolls: AtomicUsize,
    outlined: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
    active: AtomicBool,
    failing: AtomicBool,
}

impl FakeDocument {
    pub fn new(html: String) -> Arc<Self> {
        Arc::new(Self {
            html: Mutex::new(html),
            url: Url::parse(PAGE_URL).unwrap(),
            sources: AtomicUsize::new(0),
            next_id: AtomicUsize::new(0),
            scrolls: AtomicUsize::new(0),
            outlined: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
            active: AtomicBool::new(false),
            failing: AtomicBool::new(false),
        })
    }

    /// Replaces the whole page; every element is new and unstamped
    pub fn set_html(&self, html: String) {
        *self.html.lock().unwrap() = html;
    }

    /// Changes the page in place, keeping the stamps of untouched elements
    pub fn edit_html(&self, edit: impl FnOnce(&str) -> String) {
        let mut html = self.html.lock().unwrap();
        *html = edit(&html);
    }

    pub fn html(&self) -> String {
        self.html.lock().unwrap().clone()
    }

    /// Makes snapshot reads fail until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn source_calls(&self) -> usize {
        self.sources.load(Ordering::SeqCst)
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn outlined(&self) -> Vec<String> {
        self.outlined.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

fn is_live(html: &str, node: &NodeHandle) -> bool {
    let doc = Html::parse_document(html);
    find_by_node_id(&doc, &node.id).is_some_and(|el| element_text(el) == node.text)
}

const UNSTAMPED_BLOCK: &str = "<div dir=\"auto\">";

#[async_trait]
impl Document for FakeDocument {
    async fn stamp_nodes(&self, _selector: &str) -> Result<(), DocumentError> {
        let mut html = self.html.lock().unwrap();
        while let Some(at) = html.find(UNSTAMPED_BLOCK) {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            html.replace_range(
                at..at + UNSTAMPED_BLOCK.len(),
                &format!("<div dir=\"auto\" {NODE_ID_ATTR}=\"{id}\">"),
            );
        }
        Ok(())
    }

    async fn source(&self) -> Result<String, DocumentError> {
        self.sources.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DocumentError::ScriptResult("page went away".to_string()));
        }
        Ok(self.html.lock().unwrap().clone())
    }

    async fn current_url(&self) -> Result<Url, DocumentError> {
        Ok(self.url.clone())
    }

    async fn scroll_by(&self, _pixels: u32) -> Result<(), DocumentError> {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn outline(&self, node: &NodeHandle, _style: &str) -> Result<bool, DocumentError> {
        let html = self.html.lock().unwrap().clone();
        let live = is_live(&html, node);
        if live {
            self.outlined.lock().unwrap().push(node.text.clone());
        }
        Ok(live)
    }

    async fn alert(&self, message: &str) -> Result<(), DocumentError> {
        self.alerts.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn try_mark_active(&self) -> Result<bool, DocumentError> {
        Ok(!self.active.swap(true, Ordering::SeqCst))
    }

    async fn clear_active(&self) -> Result<(), DocumentError> {
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Answers immediately: posts mentioning a plumber match, posts mentioning
/// the pool fail with a server error.
#[derive(Default)]
pub struct FakeScorer {
    requests: Mutex<Vec<ScoreRequest>>,
}

impl FakeScorer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<ScoreRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.post_text).collect()
    }
}

#[async_trait]
impl Scorer for FakeScorer {
    async fn score(&self, _endpoint: &Url, request: &ScoreRequest) -> Result<ScoreResponse, SubmitError> {
        self.requests.lock().unwrap().push(request.clone());
        if request.post_text.contains("pool") {
            return Err(SubmitError::Status { status: 500 });
        }
        Ok(ScoreResponse {
            matched: request.post_text.contains("plumber"),
        })
    }
}

/// Holds every request until the test releases it
#[derive(Default)]
pub struct GatedScorer {
    requests: Mutex<Vec<ScoreRequest>>,
    waiting: Mutex<HashMap<String, oneshot::Receiver<Option<bool>>>>,
    gates: Mutex<HashMap<String, oneshot::Sender<Option<bool>>>>,
}

impl GatedScorer {
    pub fn new(texts: &[&str]) -> Arc<Self> {
        let scorer = Self::default();
        for text in texts {
            let (tx, rx) = oneshot::channel();
            scorer.waiting.lock().unwrap().insert(text.to_string(), rx);
            scorer.gates.lock().unwrap().insert(text.to_string(), tx);
        }
        Arc::new(scorer)
    }

    /// Resolves the request for `text`: `Some(matched)`, or `None` for a failure
    pub fn release(&self, text: &str, verdict: Option<bool>) {
        let gate = self.gates.lock().unwrap().remove(text).unwrap();
        gate.send(verdict).unwrap();
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Scorer for GatedScorer {
    async fn score(&self, _endpoint: &Url, request: &ScoreRequest) -> Result<ScoreResponse, SubmitError> {
        self.requests.lock().unwrap().push(request.clone());
        let gate = self.waiting.lock().unwrap().remove(&request.post_text);

        let verdict = match gate {
            Some(rx) => rx.await.unwrap_or(None),
            None => Some(false),
        };
        match verdict {
            Some(matched) => Ok(ScoreResponse { matched }),
            None => Err(SubmitError::Decode("gate closed".to_string())),
        }
    }
}
