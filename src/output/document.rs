//! Combined document assembly
//!
//! Every item becomes a [`ContentFragment`]; the [`CombinedDocument`] keeps
//! them in traversal order and renders them into one HTML file with a shared
//! stylesheet and a `<base>` pointing at the course site.

use crate::url::stub_title;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Title used when nothing usable is left after sanitizing
pub const UNTITLED: &str = "Untitled";

/// Longest title kept, in characters
pub const MAX_TITLE_CHARS: usize = 160;

const STYLESHEET: &str = r#"
    body{font-family:Arial,"Microsoft Yahei",sans-serif;line-height:1.55;}
    h1,h2,h3{page-break-after:avoid;}
    img,table{max-width:100%;}
    .page-sep{page-break-before:always;}
    .file-note{padding:8px 10px;border-left:4px solid #ccc;background:#f7f7f7;margin:8px 0;}
    "#;

const FILE_NOTE: &str = "File/External Link, click to access:";
const CAPTURE_FAILED_NOTE: &str = "Failed to capture content, click to access:";

fn illegal_title_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[/\\:*?"<>|]+"#).expect("title pattern is valid"))
}

/// Makes a title safe for headings and file names
///
/// Trims, replaces each run of `/ \ : * ? " < > |` with `_`, caps the length
/// and falls back to [`UNTITLED`].
///
/// # Examples
///
/// ```
/// use course_weave::output::sanitize_title;
///
/// assert_eq!(sanitize_title("  Week 1: Intro/Setup "), "Week 1_ Intro_Setup");
/// assert_eq!(sanitize_title("   "), "Untitled");
/// ```
pub fn sanitize_title(raw: &str) -> String {
    let replaced = illegal_title_chars().replace_all(raw.trim(), "_");
    let capped: String = replaced.chars().take(MAX_TITLE_CHARS).collect();
    if capped.is_empty() {
        UNTITLED.to_string()
    } else {
        capped
    }
}

/// Escapes text for use inside HTML element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// One item's contribution to the combined document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFragment {
    title: String,
    body_html: String,
}

impl ContentFragment {
    /// Creates a fragment; the title is sanitized here
    pub fn new(title: &str, body_html: impl Into<String>) -> Self {
        Self {
            title: sanitize_title(title),
            body_html: body_html.into(),
        }
    }

    /// Link-only stub for a file or external item, titled by its last path segment
    pub fn file_link(url: &Url) -> Self {
        Self::new(&stub_title(url), link_note(FILE_NOTE, url))
    }

    /// Stub for an item whose content could not be captured
    pub fn capture_failed(title: &str, url: &Url) -> Self {
        Self::new(title, link_note(CAPTURE_FAILED_NOTE, url))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body_html(&self) -> &str {
        &self.body_html
    }

    /// True when the body holds nothing but whitespace
    pub fn is_empty(&self) -> bool {
        self.body_html.trim().is_empty()
    }

    /// Heading, body and the page-break marker
    pub fn render(&self) -> String {
        format!(
            "<h1>{}</h1>\n{}\n<div class='page-sep'></div>",
            escape_html(&self.title),
            self.body_html
        )
    }
}

fn link_note(note: &str, url: &Url) -> String {
    let href = escape_html(url.as_str());
    format!(
        "<div class=\"file-note\">{}</div>\n<p><a href=\"{}\">{}</a></p>",
        note, href, href
    )
}

/// All fragments of one export, in traversal order
#[derive(Debug, Clone)]
pub struct CombinedDocument {
    base_url: Url,
    fragments: Vec<ContentFragment>,
}

impl CombinedDocument {
    /// Creates an empty document whose relative links resolve against `base_url`
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            fragments: Vec::new(),
        }
    }

    /// Appends a fragment after every fragment already present
    pub fn push(&mut self, fragment: ContentFragment) {
        self.fragments.push(fragment);
    }

    pub fn fragments(&self) -> &[ContentFragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Renders the full HTML document
    pub fn render(&self) -> String {
        let mut parts = vec![
            "<!doctype html>".to_string(),
            "<html><head><meta charset='utf-8'>".to_string(),
            format!("<base href='{}'>", escape_html(self.base_url.as_str())),
            format!("<style>{}</style>", STYLESHEET),
            "</head><body>".to_string(),
        ];
        parts.extend(self.fragments.iter().map(ContentFragment::render));
        parts.push("</body></html>".to_string());
        parts.join("\n")
    }
}
