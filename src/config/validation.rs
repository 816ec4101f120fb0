use crate::config::types::{
    BrowserConfig, Config, ExtractionConfig, ListingConfig, OutputConfig, TimingConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_browser_config(&config.browser)?;
    validate_listing_config(&config.listing)?;
    validate_timing_config(&config.timing)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the remote debugging endpoint
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid endpoint '{}': {}", config.endpoint, e))
    })?;

    match url.scheme() {
        "http" | "https" | "ws" | "wss" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "endpoint must use http, https, ws or wss, got '{}'",
            other
        ))),
    }
}

/// Validates the listing page URL
fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid listing URL '{}': {}", config.url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Listing URL '{}' must use http or https",
            config.url
        )));
    }

    Ok(())
}

/// Validates that every bound is usable
fn validate_timing_config(config: &TimingConfig) -> Result<(), ConfigError> {
    let bounds = [
        ("navigation-timeout-ms", config.navigation_timeout_ms),
        ("quiescence-timeout-ms", config.quiescence_timeout_ms),
        (
            "listing-quiescence-timeout-ms",
            config.listing_quiescence_timeout_ms,
        ),
        ("selector-timeout-ms", config.selector_timeout_ms),
        ("scroll-step", u64::from(config.scroll_step)),
        ("max-scroll-rounds", u64::from(config.max_scroll_rounds)),
    ];

    for (name, value) in bounds {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates custom content selectors
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    let Some(selectors) = &config.content_selectors else {
        return Ok(());
    };

    if selectors.is_empty() {
        return Err(ConfigError::Validation(
            "content-selectors cannot be an empty list".to_string(),
        ));
    }

    for selector in selectors {
        if selector.trim().is_empty() {
            return Err(ConfigError::InvalidSelector(
                "selector cannot be empty".to_string(),
            ));
        }
        scraper::Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {}", selector, e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.html_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "html-path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.docx_path, Some(p) if p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "docx-path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.report_path, Some(p) if p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "report-path cannot be empty".to_string(),
        ));
    }

    if config.pandoc.trim().is_empty() {
        return Err(ConfigError::Validation(
            "pandoc cannot be empty".to_string(),
        ));
    }

    Ok(())
}
