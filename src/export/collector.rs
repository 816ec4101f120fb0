//! Link collector for the module listing page
//!
//! This module turns a loaded listing page into the ordered list of item URLs:
//! - scrolling until lazily rendered sections stop growing the page
//! - expanding collapsed modules (best effort)
//! - harvesting item anchors, deduplicated in first-seen order
//! - resolving hrefs against the listing URL

use crate::browser::{BrowserResult, ElementTarget, PageSession, RawAnchor};
use crate::config::TimingConfig;
use crate::export::loader::settle_network;
use crate::url::resolve_href;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Anchors that link to module items, queried together in document order
pub const ITEM_ANCHOR_SELECTORS: &[&str] = &[
    "a.ig-title",
    r#"a[data-testid="context-module-item-title"]"#,
    ".ig-list a",
];

/// Controls that reveal collapsed modules, tried in priority order
pub const EXPAND_ALL_TARGETS: &[ElementTarget] = &[
    ElementTarget::Text("Expand All"),
    ElementTarget::Text("展开全部"),
    ElementTarget::Css("[data-testid='expand-all']"),
    ElementTarget::Css("button[aria-label*='Expand All' i]"),
    ElementTarget::ButtonWithText("Expand All"),
];

/// Pause before harvesting, after the second quiescence wait
const PRE_HARVEST_PAUSE: Duration = Duration::from_millis(400);

/// Pause after the expand control was clicked
const POST_EXPAND_PAUSE: Duration = Duration::from_millis(500);

/// One linked unit on the listing page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingItem {
    pub href: String,
    pub label: String,
}

impl From<RawAnchor> for ListingItem {
    fn from(anchor: RawAnchor) -> Self {
        Self {
            href: anchor.href,
            label: anchor.text.trim().to_string(),
        }
    }
}

/// Collects the ordered item URLs from the already loaded listing page
///
/// # Steps
///
/// 1. Wait for quiescence
/// 2. Scroll until the document height stops growing
/// 3. Wait for quiescence again
/// 4. Click the first expand control found
/// 5. Harvest, deduplicate and resolve item anchors
pub async fn collect_item_urls<S: PageSession + ?Sized>(
    session: &mut S,
    listing_url: &Url,
    timing: &TimingConfig,
) -> BrowserResult<Vec<Url>> {
    settle_network(session, timing.listing_quiescence_timeout()).await;

    let scrolled = scroll_to_end(
        session,
        timing.scroll_step,
        timing.scroll_pause(),
        timing.max_scroll_rounds,
    )
    .await?;
    tracing::debug!("Scroll pass grew the listing page: {}", scrolled);

    settle_network(session, timing.listing_quiescence_timeout()).await;
    tokio::time::sleep(PRE_HARVEST_PAUSE).await;

    let expanded = expand_all(session).await?;
    tracing::debug!("Expand-all control clicked: {}", expanded);

    let anchors = session.anchors(ITEM_ANCHOR_SELECTORS).await?;
    tracing::debug!("Harvested {} raw anchors", anchors.len());

    let items = dedup_items(anchors);
    Ok(resolve_items(&items, listing_url))
}

/// Scrolls down until the document height stops increasing
///
/// Returns true if the page grew beyond its first measured height. The loop
/// stops after `max_rounds` scroll steps even if the page keeps growing.
pub async fn scroll_to_end<S: PageSession + ?Sized>(
    session: &mut S,
    step: u32,
    pause: Duration,
    max_rounds: u32,
) -> BrowserResult<bool> {
    let mut last = 0;
    let mut first = None;

    for _ in 0..max_rounds {
        let height = session.document_height().await?;
        first.get_or_insert(height);
        if height <= last {
            return Ok(first.map_or(false, |f| last > f));
        }
        last = height;
        session.scroll_by(step).await?;
        tokio::time::sleep(pause).await;
    }

    tracing::warn!(
        "Listing page still growing after {} scroll steps, harvesting what is loaded",
        max_rounds
    );
    Ok(first.map_or(false, |f| last > f))
}

/// Clicks the first available expand control
///
/// Returns false when no candidate matched; that is a normal outcome.
pub async fn expand_all<S: PageSession + ?Sized>(session: &mut S) -> BrowserResult<bool> {
    for target in EXPAND_ALL_TARGETS {
        if session.click(*target).await? {
            tracing::debug!("Clicked expand control {:?}", target);
            tokio::time::sleep(POST_EXPAND_PAUSE).await;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Drops anchors without href and repeated `(href, label)` pairs
///
/// The first occurrence of each pair keeps its position.
pub fn dedup_items(anchors: Vec<RawAnchor>) -> Vec<ListingItem> {
    let mut seen = HashSet::new();
    anchors
        .into_iter()
        .map(ListingItem::from)
        .filter(|item| !item.href.is_empty())
        .filter(|item| seen.insert((item.href.clone(), item.label.clone())))
        .collect()
}

/// Resolves item hrefs against the listing URL, keeping order
pub fn resolve_items(items: &[ListingItem], listing_url: &Url) -> Vec<Url> {
    items
        .iter()
        .filter_map(|item| resolve_href(listing_url, &item.href))
        .collect()
}
