//! Configuration module for Course-Weave
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every URL, path and wait bound the exporter uses comes from here; nothing is
//! hard-coded at process level.
//!
//! # Example
//!
//! ```no_run
//! use course_weave::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("weave.toml")).unwrap();
//! println!("Settle pause: {}ms", config.timing.settle_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, ExtractionConfig, ListingConfig, OutputConfig, TimingConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, parse_config, read_config_with_hash};
pub use validation::validate;
