//! Export pipeline
//!
//! This module contains the core extraction-and-aggregation logic:
//! - Page loading with bounded settle and quiescence waits
//! - Link collection from the module listing page
//! - Content extraction through a selector cascade
//! - Sequential coordination of all items into one document

mod collector;
mod coordinator;
mod extractor;
mod loader;

pub use collector::{
    collect_item_urls, dedup_items, expand_all, resolve_items, scroll_to_end, ListingItem,
    EXPAND_ALL_TARGETS, ITEM_ANCHOR_SELECTORS,
};
pub use coordinator::{deliver, run_export, Exporter};
pub use extractor::{
    body_markup, ContentExtractor, ContentRule, DocumentBodyRule, SelectorRule,
    DEFAULT_CONTENT_SELECTORS, HEADING_SELECTORS,
};
pub use loader::{load_page, settle_network};

use crate::output::CombinedDocument;

/// What happened to one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOutcome {
    /// Content was captured from the page
    Extracted,
    /// File or external reference, recorded as a link stub
    FileOrExternal,
    /// The page failed to load or had no content, recorded as a link stub
    CaptureFailed,
}

impl ItemOutcome {
    /// Label used in progress lines and the report
    pub fn label(&self) -> &'static str {
        match self {
            Self::Extracted => "Extracted",
            Self::FileOrExternal => "File/External Link",
            Self::CaptureFailed => "Failed to Capture",
        }
    }

    /// Returns true if the item's fragment is a stub
    pub fn is_stub(&self) -> bool {
        !matches!(self, Self::Extracted)
    }
}

/// Progress record for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// 1-based position in listing order
    pub index: usize,
    pub url: String,
    pub title: String,
    pub outcome: ItemOutcome,
}

/// Result of running the pipeline against a listing
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub document: CombinedDocument,
    pub items: Vec<ItemRecord>,
}
