//! Output sink trait and the file-backed implementation
//!
//! The exporter only produces markup; sinks decide where it ends up.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the combined document
pub trait OutputSink: Send + Sync {
    /// Persists the rendered document and returns where it was written
    fn write_document(&self, html: &str) -> OutputResult<PathBuf>;
}

/// Writes the document to a file, creating parent directories as needed
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputSink for FileSink {
    fn write_document(&self, html: &str) -> OutputResult<PathBuf> {
        write_file(&self.path, html)?;
        Ok(self.path.clone())
    }
}

/// Writes UTF-8 text to `path`, creating missing parent directories
pub fn write_file(path: &Path, content: &str) -> OutputResult<()> {
    let wrap = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, content).map_err(wrap)
}
