//! Export coordinator - main pipeline orchestration
//!
//! This module contains the sequential item loop that ties the pieces together:
//! - loading the listing page and collecting item URLs
//! - classifying each item
//! - loading and extracting content items
//! - degrading every per-item failure to a stub fragment
//! - handing the finished document to the output sink and converter

use crate::browser::{self, PageSession};
use crate::config::{Config, TimingConfig};
use crate::export::collector::collect_item_urls;
use crate::export::extractor::ContentExtractor;
use crate::export::loader::load_page;
use crate::export::{ExportOutcome, ItemOutcome, ItemRecord};
use crate::output::{
    write_markdown_report, CombinedDocument, ContentFragment, DocumentConverter, ExportSummary,
    FileSink, OutputSink, PandocConverter,
};
use crate::url::{classify_item, stub_title, ItemKind};
use crate::WeaveError;
use chrono::Utc;
use std::path::Path;
use url::Url;

/// Drives one browser tab through a listing and its items
///
/// The exporter owns the session for the whole run; items are processed one
/// at a time because every step acts on the single loaded page.
pub struct Exporter<S: PageSession> {
    session: S,
    timing: TimingConfig,
    extractor: ContentExtractor,
}

impl<S: PageSession> Exporter<S> {
    /// Creates an exporter using the timing and content selectors from `config`
    pub fn new(session: S, config: &Config) -> Self {
        let timing = config.timing.clone();
        let extractor = match &config.extraction.content_selectors {
            Some(selectors) => ContentExtractor::new(selectors.clone(), timing.selector_timeout()),
            None => ContentExtractor::with_defaults(timing.selector_timeout()),
        };
        Self::with_extractor(session, timing, extractor)
    }

    /// Creates an exporter with an explicit extractor
    pub fn with_extractor(session: S, timing: TimingConfig, extractor: ContentExtractor) -> Self {
        Self {
            session,
            timing,
            extractor,
        }
    }

    /// Gives the session back, e.g. to disconnect it
    pub fn into_session(self) -> S {
        self.session
    }

    /// Loads the listing page and returns the ordered item URLs
    ///
    /// Failures here are fatal: without a listing there is nothing to export.
    pub async fn collect(&mut self, listing_url: &Url) -> Result<Vec<Url>, WeaveError> {
        let listing_error = |source| WeaveError::Listing {
            url: listing_url.to_string(),
            source,
        };

        load_page(&mut self.session, listing_url, &self.timing)
            .await
            .map_err(listing_error)?;
        collect_item_urls(&mut self.session, listing_url, &self.timing)
            .await
            .map_err(listing_error)
    }

    /// Produces the fragment for one item; never fails
    pub async fn process_item(
        &mut self,
        index: usize,
        url: &Url,
    ) -> (ContentFragment, ItemOutcome) {
        if classify_item(url) == ItemKind::FileOrExternal {
            return (ContentFragment::file_link(url), ItemOutcome::FileOrExternal);
        }

        if let Err(e) = load_page(&mut self.session, url, &self.timing).await {
            tracing::warn!("[{}] Could not load {}: {}", index, url, e);
            return (
                ContentFragment::capture_failed(&stub_title(url), url),
                ItemOutcome::CaptureFailed,
            );
        }

        let fragment = self.extractor.extract(&mut self.session).await;
        if fragment.is_empty() {
            tracing::warn!("[{}] No content found on {}", index, url);
            return (
                ContentFragment::capture_failed(fragment.title(), url),
                ItemOutcome::CaptureFailed,
            );
        }

        (fragment, ItemOutcome::Extracted)
    }

    /// Runs the whole pipeline against `listing_url`
    ///
    /// The returned document holds exactly one fragment per collected URL,
    /// in collection order.
    pub async fn export(&mut self, listing_url: &Url) -> Result<ExportOutcome, WeaveError> {
        let urls = self.collect(listing_url).await?;
        tracing::info!("Found {} module items", urls.len());

        let mut document = CombinedDocument::new(listing_url.clone());
        let mut items = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            let index = i + 1;
            let (fragment, outcome) = self.process_item(index, url).await;
            tracing::info!("[{}] {}: {}", index, outcome.label(), fragment.title());

            items.push(ItemRecord {
                index,
                url: url.to_string(),
                title: fragment.title().to_string(),
                outcome,
            });
            document.push(fragment);
        }

        Ok(ExportOutcome { document, items })
    }
}

/// Writes the document and, if requested, converts it
///
/// A conversion failure is logged and recorded in `summary`; only a failure
/// to write the document itself is an error.
pub async fn deliver(
    document: &CombinedDocument,
    sink: &dyn OutputSink,
    conversion: Option<(&dyn DocumentConverter, &Path)>,
    summary: &mut ExportSummary,
) -> Result<(), WeaveError> {
    let html_path = sink.write_document(&document.render())?;
    tracing::info!("Generated HTML file: {}", html_path.display());

    if let Some((converter, target)) = conversion {
        match converter.convert(&html_path, target).await {
            Ok(converted) => {
                tracing::info!("Generated converted file: {}", converted.display());
                summary.converted_path = Some(converted);
            }
            Err(e) => {
                tracing::warn!("Conversion skipped: {}", e);
                summary.conversion_error = Some(e.to_string());
            }
        }
    }

    summary.html_path = Some(html_path);
    Ok(())
}

/// Runs a complete export described by `config`
///
/// Connects to the browser, exports the listing, writes the HTML, converts it
/// when a `docx-path` is configured and writes the report when a
/// `report-path` is configured.
///
/// # Example
///
/// ```no_run
/// use course_weave::config::load_config;
/// use course_weave::export::run_export;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("weave.toml"))?;
/// let summary = run_export(&config, None).await?;
/// println!("{} items", summary.items.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_export(
    config: &Config,
    config_hash: Option<String>,
) -> Result<ExportSummary, WeaveError> {
    let listing_url = Url::parse(&config.listing.url)?;
    let mut summary = ExportSummary::new(listing_url.as_str(), Utc::now());
    summary.config_hash = config_hash;

    let longest_wait = config.timing.longest_wait();
    let session = browser::connect(&config.browser.endpoint, longest_wait).await?;
    let mut exporter = Exporter::new(session, config);
    let exported = exporter.export(&listing_url).await;
    exporter.into_session().disconnect();
    let outcome = exported?;

    let sink = FileSink::new(&config.output.html_path);
    let converter = PandocConverter::new(&config.output.pandoc);
    let conversion = config
        .output
        .docx_path
        .as_deref()
        .map(|path| (&converter as &dyn DocumentConverter, Path::new(path)));
    deliver(&outcome.document, &sink, conversion, &mut summary).await?;

    summary.items = outcome.items;
    summary.finished_at = Some(Utc::now());

    if let Some(report_path) = &config.output.report_path {
        match write_markdown_report(&summary, Path::new(report_path)) {
            Ok(()) => tracing::info!("Wrote export report: {}", report_path),
            Err(e) => tracing::warn!("Could not write export report: {}", e),
        }
    }

    Ok(summary)
}
