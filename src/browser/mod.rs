//! Browser session abstraction
//!
//! Defines the `PageSession` trait the exporter drives. The only production
//! implementation is a Chromium tab reached over the DevTools protocol
//! (see [`chromium`]); tests drive the exporter with in-memory pages.

pub mod chromium;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub use chromium::{connect, discover_websocket_url, ChromiumSession};

/// Errors raised while talking to the remote browser
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to query debugging endpoint {endpoint}: {source}")]
    Endpoint {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("Debugging endpoint {0} did not report a webSocketDebuggerUrl")]
    MissingWebSocketUrl(String),

    #[error("Failed to connect to browser: {0}")]
    Connect(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("Script evaluation failed: {0}")]
    Script(String),
}

/// Result type alias for browser operations
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// An element the exporter may click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementTarget {
    /// Any element matching a CSS selector
    Css(&'static str),
    /// The element whose own text equals the given text (case-insensitive)
    Text(&'static str),
    /// A `<button>` whose text contains the given text
    ButtonWithText(&'static str),
}

/// An anchor harvested from the listing page, before deduplication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnchor {
    /// The `href` attribute as written in the page
    pub href: String,
    /// The anchor's trimmed text content
    pub text: String,
}

/// A single browser tab the exporter navigates and reads from
///
/// The session is a shared mutable resource: every operation acts on the
/// currently loaded page, so callers must never interleave navigations.
#[async_trait]
pub trait PageSession: Send {
    /// Navigate and return once the DOM has been parsed
    async fn goto(&mut self, url: &Url, timeout: Duration) -> BrowserResult<()>;

    /// Wait until the page's network activity settles
    ///
    /// Returns `Ok(false)` when `timeout` elapsed first.
    async fn wait_for_quiescence(&mut self, timeout: Duration) -> BrowserResult<bool>;

    /// Current scrollable height of the document in pixels
    async fn document_height(&mut self) -> BrowserResult<u64>;

    /// Scroll the window down by `step` pixels
    async fn scroll_by(&mut self, step: u32) -> BrowserResult<()>;

    /// Click the first element matching `target`; `Ok(false)` when none matched
    async fn click(&mut self, target: ElementTarget) -> BrowserResult<bool>;

    /// All anchors matching any of `selectors`, in document order
    async fn anchors(&mut self, selectors: &[&str]) -> BrowserResult<Vec<RawAnchor>>;

    /// The document title, empty when the page has none
    async fn title(&mut self) -> BrowserResult<String>;

    /// Wait until `selector` matches an element; `Ok(false)` on timeout
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration)
        -> BrowserResult<bool>;

    /// Inner HTML of the first element matching `selector`
    async fn inner_html(&mut self, selector: &str) -> BrowserResult<Option<String>>;

    /// Text content of the first element matching `selector`
    async fn text_content(&mut self, selector: &str) -> BrowserResult<Option<String>>;

    /// Serialized HTML of the whole document
    async fn document_html(&mut self) -> BrowserResult<String>;
}
