//! Course-Weave main entry point
//!
//! This is the command-line interface for the Course-Weave course exporter.

use anyhow::Context;
use clap::Parser;
use course_weave::config::{read_config_with_hash, validate, Config};
use course_weave::export::{run_export, ItemOutcome};
use course_weave::output::ExportSummary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Course-Weave: merge a course's modules into one document
///
/// Course-Weave attaches to a running Chromium instance, walks a course's
/// module listing in order and writes every item's content into a single
/// HTML file, optionally converted to Word with pandoc.
#[derive(Parser, Debug)]
#[command(name = "course-weave")]
#[command(version)]
#[command(about = "Merge a module-structured course site into one document", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the module listing URL from the config
    #[arg(long, value_name = "URL")]
    listing_url: Option<String>,

    /// Override the browser debugging endpoint from the config
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Skip conversion even if a docx-path is configured
    #[arg(long)]
    no_convert: bool,

    /// Validate config and show what would be exported without connecting
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = read_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    let summary = run_export(&config, Some(config_hash))
        .await
        .context("export failed")?;
    if cli.quiet {
        for warning in summary.warnings() {
            eprintln!("{}", warning);
        }
    } else {
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("course_weave=info,warn"),
            1 => EnvFilter::new("course_weave=debug,info"),
            2 => EnvFilter::new("course_weave=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line values win over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.listing_url {
        config.listing.url = url.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.browser.endpoint = endpoint.clone();
    }
    if cli.no_convert {
        config.output.docx_path = None;
    }
}

fn print_dry_run(config: &Config) {
    println!("=== Course-Weave Dry Run ===\n");

    println!("Browser endpoint: {}", config.browser.endpoint);
    println!("Listing: {}", config.listing.url);

    println!("\nTiming:");
    println!(
        "  Navigation timeout: {}ms",
        config.timing.navigation_timeout_ms
    );
    println!("  Settle: {}ms", config.timing.settle_ms);
    println!(
        "  Quiescence timeout: {}ms (listing {}ms)",
        config.timing.quiescence_timeout_ms, config.timing.listing_quiescence_timeout_ms
    );
    println!(
        "  Selector timeout: {}ms",
        config.timing.selector_timeout_ms
    );
    println!(
        "  Scroll: {}px every {}ms, at most {} rounds",
        config.timing.scroll_step, config.timing.scroll_pause_ms, config.timing.max_scroll_rounds
    );

    match &config.extraction.content_selectors {
        Some(selectors) => {
            println!("\nContent selectors ({}):", selectors.len());
            for selector in selectors {
                println!("  - {}", selector);
            }
        }
        None => println!("\nContent selectors: built-in cascade"),
    }

    println!("\nOutput:");
    println!("  HTML: {}", config.output.html_path);
    match &config.output.docx_path {
        Some(path) => println!("  Converted: {} (via {})", path, config.output.pandoc),
        None => println!("  Converted: skipped"),
    }
    if let Some(path) = &config.output.report_path {
        println!("  Report: {}", path);
    }

    println!("\n✓ Configuration is valid");
}

fn print_summary(summary: &ExportSummary) {
    println!("\n=== Export Complete ===");
    println!("Items: {}", summary.items.len());
    println!("  Extracted: {}", summary.count(ItemOutcome::Extracted));
    println!(
        "  File/External: {}",
        summary.count(ItemOutcome::FileOrExternal)
    );
    println!(
        "  Failed to capture: {}",
        summary.count(ItemOutcome::CaptureFailed)
    );

    if let Some(path) = &summary.html_path {
        println!("HTML: {}", path.display());
    }
    if let Some(status) = summary.conversion_status() {
        println!("{}", status);
    }
}
