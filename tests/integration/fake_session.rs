//! In-memory page session backed by scraper
//!
//! Pages are static HTML strings keyed by URL. Parsing happens inside plain
//! functions so no `Html` value lives across an await point.

use async_trait::async_trait;
use course_weave::browser::{BrowserError, BrowserResult, ElementTarget, PageSession, RawAnchor};
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use url::Url;

const BLANK_PAGE: &str = "<html><head></head><body></body></html>";

#[derive(Default)]
pub struct FakeSession {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    clickable: Vec<ElementTarget>,
    heights: Vec<u64>,
    growing: bool,
    current: String,
    pub visits: Vec<String>,
    pub clicks: Vec<ElementTarget>,
    pub scrolls: usize,
}

impl FakeSession {
    pub fn new() -> Self {
        Self {
            current: BLANK_PAGE.to_string(),
            ..Default::default()
        }
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn with_clickable(mut self, target: ElementTarget) -> Self {
        self.clickable.push(target);
        self
    }

    /// Height reported after 0, 1, 2... scroll steps; the last value repeats
    pub fn with_heights(mut self, heights: &[u64]) -> Self {
        self.heights = heights.to_vec();
        self
    }

    /// Height grows by 500px with every scroll step, forever
    pub fn growing_forever(mut self) -> Self {
        self.growing = true;
        self
    }

    /// Makes `html` the current page without a navigation
    pub fn show(&mut self, html: &str) {
        self.current = html.to_string();
    }
}

fn first_match<T>(html: &str, selector: &str, f: impl Fn(scraper::ElementRef) -> T) -> Option<T> {
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);
    let found = document.select(&selector).next().map(f);
    found
}

fn harvest_anchors(html: &str, selectors: &[&str]) -> Vec<RawAnchor> {
    let Ok(selector) = Selector::parse(&selectors.join(", ")) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .map(|a| RawAnchor {
            href: a.value().attr("href").unwrap_or_default().to_string(),
            text: a.text().collect::<String>().trim().to_string(),
        })
        .collect()
}

#[async_trait]
impl PageSession for FakeSession {
    async fn goto(&mut self, url: &Url, _timeout: Duration) -> BrowserResult<()> {
        self.visits.push(url.to_string());
        if self.failing.contains(url.as_str()) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        self.current = self
            .pages
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| BLANK_PAGE.to_string());
        Ok(())
    }

    async fn wait_for_quiescence(&mut self, _timeout: Duration) -> BrowserResult<bool> {
        Ok(true)
    }

    async fn document_height(&mut self) -> BrowserResult<u64> {
        if self.growing {
            return Ok(1000 + 500 * self.scrolls as u64);
        }
        let index = self.scrolls.min(self.heights.len().saturating_sub(1));
        Ok(self.heights.get(index).copied().unwrap_or(1000))
    }

    async fn scroll_by(&mut self, _step: u32) -> BrowserResult<()> {
        self.scrolls += 1;
        Ok(())
    }

    async fn click(&mut self, target: ElementTarget) -> BrowserResult<bool> {
        self.clicks.push(target);
        Ok(self.clickable.contains(&target))
    }

    async fn anchors(&mut self, selectors: &[&str]) -> BrowserResult<Vec<RawAnchor>> {
        Ok(harvest_anchors(&self.current, selectors))
    }

    async fn title(&mut self) -> BrowserResult<String> {
        let title = first_match(&self.current, "title", |t| t.text().collect::<String>());
        Ok(title.unwrap_or_default())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> BrowserResult<bool> {
        Ok(first_match(&self.current, selector, |_| ()).is_some())
    }

    async fn inner_html(&mut self, selector: &str) -> BrowserResult<Option<String>> {
        Ok(first_match(&self.current, selector, |e| e.inner_html()))
    }

    async fn text_content(&mut self, selector: &str) -> BrowserResult<Option<String>> {
        let text = first_match(&self.current, selector, |e| e.text().collect::<String>());
        Ok(text)
    }

    async fn document_html(&mut self) -> BrowserResult<String> {
        Ok(self.current.clone())
    }
}
