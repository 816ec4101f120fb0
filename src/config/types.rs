use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Course-Weave
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub browser: BrowserConfig,
    pub listing: ListingConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// Remote browser connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Remote debugging endpoint, either `http://host:port` or a `ws://` URL
    pub endpoint: String,
}

/// Listing page configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// URL of the course's module listing page
    pub url: String,
}

/// Bounds for every wait the exporter performs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Hard limit for a single navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// Pause after the DOM is parsed so client-side rendering can run (milliseconds)
    #[serde(rename = "settle-ms")]
    pub settle_ms: u64,

    /// Upper bound on the network quiescence wait for item pages (milliseconds)
    #[serde(rename = "quiescence-timeout-ms")]
    pub quiescence_timeout_ms: u64,

    /// Upper bound on the network quiescence wait for the listing page (milliseconds)
    #[serde(rename = "listing-quiescence-timeout-ms")]
    pub listing_quiescence_timeout_ms: u64,

    /// How long a single selector may take to appear (milliseconds)
    #[serde(rename = "selector-timeout-ms")]
    pub selector_timeout_ms: u64,

    /// Pixels scrolled per step on the listing page
    #[serde(rename = "scroll-step")]
    pub scroll_step: u32,

    /// Pause after each scroll step (milliseconds)
    #[serde(rename = "scroll-pause-ms")]
    pub scroll_pause_ms: u64,

    /// Maximum number of scroll steps before giving up on lazy content
    #[serde(rename = "max-scroll-rounds")]
    pub max_scroll_rounds: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 90_000,
            settle_ms: 800,
            quiescence_timeout_ms: 3_000,
            listing_quiescence_timeout_ms: 30_000,
            selector_timeout_ms: 1_500,
            scroll_step: 900,
            scroll_pause_ms: 250,
            max_scroll_rounds: 200,
        }
    }
}

impl TimingConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn quiescence_timeout(&self) -> Duration {
        Duration::from_millis(self.quiescence_timeout_ms)
    }

    pub fn listing_quiescence_timeout(&self) -> Duration {
        Duration::from_millis(self.listing_quiescence_timeout_ms)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    /// Longest single wait the browser may be asked to perform
    pub fn longest_wait(&self) -> Duration {
        [
            self.navigation_timeout_ms,
            self.quiescence_timeout_ms,
            self.listing_quiescence_timeout_ms,
            self.selector_timeout_ms,
        ]
        .into_iter()
        .max()
        .map_or(Duration::ZERO, Duration::from_millis)
    }
}

/// Content extraction overrides
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionConfig {
    /// Replaces the built-in content selector cascade when set
    #[serde(rename = "content-selectors", default)]
    pub content_selectors: Option<Vec<String>>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the combined HTML document
    #[serde(rename = "html-path")]
    pub html_path: String,

    /// Path of the converted Word document; conversion is skipped when absent
    #[serde(rename = "docx-path", default)]
    pub docx_path: Option<String>,

    /// Path of the markdown export report
    #[serde(rename = "report-path", default)]
    pub report_path: Option<String>,

    /// Converter program
    #[serde(default = "default_pandoc")]
    pub pandoc: String,
}

fn default_pandoc() -> String {
    "pandoc".to_string()
}
