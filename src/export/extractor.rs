//! Content extraction for item pages
//!
//! An item's title comes from the document title, overridden by the first
//! heading candidate that shows up. Its body comes from an ordered cascade of
//! [`ContentRule`]s: the first rule that yields non-empty markup wins and no
//! markup is merged across rules. Supporting a new page layout means adding a
//! rule to the list.

use crate::browser::{BrowserResult, PageSession};
use crate::output::ContentFragment;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;

/// Content containers, most specific first
pub const DEFAULT_CONTENT_SELECTORS: &[&str] = &[
    "#wiki_page_show .show-content",
    "#content .show-content",
    "#content .user_content",
    ".ic-Layout-contentMain .user_content",
    "#assignment_show .description",
    "#assignment_show .user_content",
    ".quiz-index .user_content",
    ".discussion_topic .user_content",
    "#content",
    "main",
    "body",
];

/// Elements whose text beats the document title, in priority order
pub const HEADING_SELECTORS: &[&str] = &["h1", ".page-title", "#breadcrumbs .ellipsible"];

/// One step of the body cascade
#[async_trait]
pub trait ContentRule: Send + Sync {
    /// Short description used in logs
    fn describe(&self) -> String;

    /// Markup produced by this rule, `None` when the rule does not apply
    async fn extract(
        &self,
        session: &mut dyn PageSession,
        wait: Duration,
    ) -> BrowserResult<Option<String>>;
}

/// Inner HTML of the first element matching a CSS selector
#[derive(Debug, Clone)]
pub struct SelectorRule {
    selector: String,
}

impl SelectorRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

#[async_trait]
impl ContentRule for SelectorRule {
    fn describe(&self) -> String {
        format!("selector `{}`", self.selector)
    }

    async fn extract(
        &self,
        session: &mut dyn PageSession,
        wait: Duration,
    ) -> BrowserResult<Option<String>> {
        if !session.wait_for_selector(&self.selector, wait).await? {
            return Ok(None);
        }
        Ok(session
            .inner_html(&self.selector)
            .await?
            .filter(|html| !html.trim().is_empty()))
    }
}

/// Serialized `<body>` of a full parse of the page's HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentBodyRule;

#[async_trait]
impl ContentRule for DocumentBodyRule {
    fn describe(&self) -> String {
        "document body".to_string()
    }

    async fn extract(
        &self,
        session: &mut dyn PageSession,
        _wait: Duration,
    ) -> BrowserResult<Option<String>> {
        let html = session.document_html().await?;
        Ok(body_markup(&html))
    }
}

/// Parses a full document and serializes its `<body>` element
pub fn body_markup(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("body").ok()?;
    document
        .select(&selector)
        .next()
        .filter(|body| !body.inner_html().trim().is_empty())
        .map(|body| body.html())
}

/// Title resolution plus the body cascade for one page
pub struct ContentExtractor {
    rules: Vec<Box<dyn ContentRule>>,
    wait: Duration,
}

impl ContentExtractor {
    /// Builds the cascade from `selectors`, followed by the document body fallback
    pub fn new<I, T>(selectors: I, wait: Duration) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut rules: Vec<Box<dyn ContentRule>> = selectors
            .into_iter()
            .map(|s| Box::new(SelectorRule::new(s)) as Box<dyn ContentRule>)
            .collect();
        rules.push(Box::new(DocumentBodyRule));
        Self { rules, wait }
    }

    /// The built-in cascade
    pub fn with_defaults(wait: Duration) -> Self {
        Self::new(DEFAULT_CONTENT_SELECTORS.iter().copied(), wait)
    }

    /// Appends a rule after every existing one
    pub fn push_rule(&mut self, rule: Box<dyn ContentRule>) {
        self.rules.push(rule);
    }

    /// Number of rules in the cascade, fallback included
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Extracts the current page
    ///
    /// A rule that errors is treated like a rule that found nothing. The
    /// returned fragment has an empty body when every rule came up empty;
    /// the caller decides what to substitute.
    pub async fn extract(&self, session: &mut dyn PageSession) -> ContentFragment {
        let title = self.resolve_title(session).await;

        for rule in &self.rules {
            match rule.extract(session, self.wait).await {
                Ok(Some(html)) => {
                    tracing::debug!("Content found via {}", rule.describe());
                    return ContentFragment::new(&title, html);
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("{} failed: {}", rule.describe(), e),
            }
        }

        ContentFragment::new(&title, String::new())
    }

    /// Document title, overridden by the first non-empty heading candidate
    pub async fn resolve_title(&self, session: &mut dyn PageSession) -> String {
        let mut title = session.title().await.unwrap_or_default();

        let any_heading = HEADING_SELECTORS.join(", ");
        if let Ok(true) = session.wait_for_selector(&any_heading, self.wait).await {
            for selector in HEADING_SELECTORS {
                if let Ok(Some(text)) = session.text_content(selector).await {
                    if !text.trim().is_empty() {
                        title = text.trim().to_string();
                        break;
                    }
                }
            }
        }

        title
    }
}
