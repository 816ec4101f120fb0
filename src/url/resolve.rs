use url::Url;

/// Resolves a listing href against the listing page URL
///
/// Returns `None` for empty hrefs and for hrefs the URL parser rejects, so
/// every URL handed to the exporter is absolute and well-formed.
///
/// # Examples
///
/// ```
/// use course_weave::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://lms.example.edu/courses/1/modules").unwrap();
/// let url = resolve_href(&base, "/courses/1/pages/intro").unwrap();
/// assert_eq!(url.as_str(), "https://lms.example.edu/courses/1/pages/intro");
/// ```
pub fn resolve_href(base_url: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => Some(absolute_url),
        Err(e) => {
            tracing::debug!("Dropping unresolvable href '{}': {}", href, e);
            None
        }
    }
}
