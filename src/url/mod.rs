//! URL handling module for Course-Weave
//!
//! This module resolves listing hrefs into absolute URLs and classifies item
//! URLs as extractable content or file/external references.

mod classify;
mod resolve;

// Re-export main functions
pub use classify::{
    classify_item, is_file_or_external, stub_title, ItemKind, FILE_OR_EXTERNAL_MARKERS,
};
pub use resolve::resolve_href;
