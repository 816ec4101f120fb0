//! Output module for the combined document and its by-products
//!
//! This module handles:
//! - Assembling fragments into the combined HTML document
//! - Writing the document through an output sink
//! - Converting the document with an external converter
//! - Generating the markdown export report

mod convert;
mod document;
mod report;
mod sink;

pub use convert::{ConvertError, DocumentConverter, PandocConverter};
pub use document::{
    escape_html, sanitize_title, CombinedDocument, ContentFragment, MAX_TITLE_CHARS, UNTITLED,
};
pub use report::{format_markdown_report, write_markdown_report, ExportSummary};
pub use sink::{write_file, FileSink, OutputError, OutputResult, OutputSink};
