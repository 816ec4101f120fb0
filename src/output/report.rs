//! Export report generation
//!
//! A markdown record of one export: when it ran, what it produced and the
//! outcome of every item in listing order.

use crate::export::{ItemOutcome, ItemRecord};
use crate::output::sink::{write_file, OutputResult};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Everything known about a finished export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub listing_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub config_hash: Option<String>,
    pub items: Vec<ItemRecord>,
    pub html_path: Option<PathBuf>,
    pub converted_path: Option<PathBuf>,
    pub conversion_error: Option<String>,
}

impl ExportSummary {
    pub fn new(listing_url: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            listing_url: listing_url.into(),
            started_at,
            finished_at: None,
            config_hash: None,
            items: Vec::new(),
            html_path: None,
            converted_path: None,
            conversion_error: None,
        }
    }

    /// Number of items with the given outcome
    pub fn count(&self, outcome: ItemOutcome) -> usize {
        self.items.iter().filter(|i| i.outcome == outcome).count()
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of items whose content was captured, as a percentage
    pub fn capture_rate(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        (self.count(ItemOutcome::Extracted) as f64 / self.items.len() as f64) * 100.0
    }

    /// One-line result of the conversion step, `None` when none was requested
    pub fn conversion_status(&self) -> Option<String> {
        match (&self.converted_path, &self.conversion_error) {
            (Some(path), _) => Some(format!("Converted: {}", path.display())),
            (None, Some(error)) => Some(format!("Conversion skipped: {}", error)),
            (None, None) => None,
        }
    }

    /// Lines to show even when the summary is suppressed
    pub fn warnings(&self) -> Vec<String> {
        match &self.conversion_error {
            Some(error) => vec![format!("Conversion skipped: {}", error)],
            None => Vec::new(),
        }
    }
}

/// Writes the markdown report to `output_path`
pub fn write_markdown_report(summary: &ExportSummary, output_path: &Path) -> OutputResult<()> {
    write_file(output_path, &format_markdown_report(summary))
}

/// Formats an export summary as markdown
pub fn format_markdown_report(summary: &ExportSummary) -> String {
    let mut md = String::new();

    md.push_str("# Course-Weave Export Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Listing**: {}\n", summary.listing_url));
    md.push_str(&format!(
        "- **Started**: {}\n",
        summary.started_at.to_rfc3339()
    ));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = summary.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Output\n\n");
    if let Some(path) = &summary.html_path {
        md.push_str(&format!("- **HTML**: {}\n", path.display()));
    }
    match (&summary.converted_path, &summary.conversion_error) {
        (Some(path), _) => md.push_str(&format!("- **Converted**: {}\n", path.display())),
        (None, Some(error)) => md.push_str(&format!("- **Conversion failed**: {}\n", error)),
        (None, None) => md.push_str("- **Converted**: skipped\n"),
    }
    md.push('\n');

    md.push_str("## Outcomes\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    for outcome in [
        ItemOutcome::Extracted,
        ItemOutcome::FileOrExternal,
        ItemOutcome::CaptureFailed,
    ] {
        md.push_str(&format!(
            "| {} | {} |\n",
            outcome.label(),
            summary.count(outcome)
        ));
    }
    md.push_str(&format!("| Total | {} |\n\n", summary.items.len()));
    md.push_str(&format!("Capture rate: {:.2}%\n\n", summary.capture_rate()));

    if !summary.items.is_empty() {
        md.push_str("## Items\n\n");
        md.push_str("| # | Title | Outcome | URL |\n");
        md.push_str("|---|-------|---------|-----|\n");
        for item in &summary.items {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                item.index,
                item.title.replace('|', "\\|"),
                item.outcome.label(),
                item.url
            ));
        }
        md.push('\n');
    }

    md
}
