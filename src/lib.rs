//! Course-Weave: merge a module-structured course site into one document
//!
//! This crate drives a remote Chromium tab through a course's module listing,
//! visits every item in listing order, extracts each item's principal content
//! and weaves the results into a single styled HTML document.

pub mod browser;
pub mod config;
pub mod export;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Course-Weave operations
#[derive(Debug, Error)]
pub enum WeaveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Listing page {url} could not be loaded: {source}")]
    Listing {
        url: String,
        source: browser::BrowserError,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Course-Weave operations
pub type Result<T> = std::result::Result<T, WeaveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use export::{run_export, ExportOutcome, Exporter, ItemOutcome, ItemRecord};
pub use output::{CombinedDocument, ContentFragment};
pub use url::{classify_item, is_file_or_external, ItemKind};
