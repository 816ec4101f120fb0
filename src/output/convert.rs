//! Conversion of the combined HTML into a secondary format
//!
//! Conversion is an add-on: a missing or failing converter is reported to the
//! user and never invalidates the HTML that was already written.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

/// Errors raised by a document converter
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Converter '{program}' is not installed (see https://pandoc.org/installing.html)")]
    Unavailable { program: String },

    #[error("Converter '{program}' could not be started: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Converter '{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Converts a document file into another file
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, input: &Path, output: &Path) -> Result<PathBuf, ConvertError>;
}

/// Converts HTML to Word (or any format pandoc infers from the output extension)
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: String,
}

impl PandocConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

#[async_trait]
impl DocumentConverter for PandocConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<PathBuf, ConvertError> {
        tracing::debug!(
            "Running {} {} -> {}",
            self.program,
            input.display(),
            output.display()
        );

        let result = Command::new(&self.program)
            .arg(input)
            .arg("--from")
            .arg("html")
            .arg("--output")
            .arg(output)
            .output()
            .await;

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConvertError::Unavailable {
                    program: self.program.clone(),
                })
            }
            Err(e) => {
                return Err(ConvertError::Spawn {
                    program: self.program.clone(),
                    source: e,
                })
            }
        };

        if !out.status.success() {
            return Err(ConvertError::Failed {
                program: self.program.clone(),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        Ok(output.to_path_buf())
    }
}
