use url::Url;

/// Substrings that mark a URL as a file download or an external resource
///
/// Matched against the lower-cased URL.
pub const FILE_OR_EXTERNAL_MARKERS: &[&str] = &[
    "/files/",
    ".pdf",
    ".ppt",
    ".pptx",
    ".doc",
    ".docx",
    ".xls",
    ".xlsx",
    "/external_tools/",
    "/external_urls/",
];

/// How an item reachable from the listing page is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Inline content, visited and extracted
    Content,
    /// File or external reference, recorded as a link-only stub
    FileOrExternal,
}

impl ItemKind {
    /// Returns true if the item page should be loaded and extracted
    pub fn should_extract(&self) -> bool {
        matches!(self, Self::Content)
    }
}

/// Checks if a URL points to a file or an external link
///
/// # Examples
///
/// ```
/// use course_weave::url::is_file_or_external;
///
/// assert!(is_file_or_external("https://lms.example.edu/courses/1/files/5"));
/// assert!(is_file_or_external("https://lms.example.edu/slides/Week1.PDF"));
/// assert!(!is_file_or_external("https://lms.example.edu/courses/1/pages/intro"));
/// ```
pub fn is_file_or_external(url: &str) -> bool {
    let lowered = url.to_lowercase();
    FILE_OR_EXTERNAL_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Classifies an item URL
pub fn classify_item(url: &Url) -> ItemKind {
    if is_file_or_external(url.as_str()) {
        ItemKind::FileOrExternal
    } else {
        ItemKind::Content
    }
}

/// Returns the final path segment of a URL, used as a stub title
///
/// An URL ending in `/` yields an empty string; the title sanitizer turns
/// that into the placeholder.
pub fn stub_title(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(str::to_string)
        .unwrap_or_default()
}
