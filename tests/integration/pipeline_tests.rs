//! End-to-end runs of the export pipeline against the in-memory session

use crate::fake_session::FakeSession;
use course_weave::browser::ElementTarget;
use course_weave::config::{parse_config, Config, TimingConfig};
use course_weave::export::{
    collect_item_urls, deliver, expand_all, scroll_to_end, ContentExtractor, Exporter,
    DEFAULT_CONTENT_SELECTORS,
};
use course_weave::output::{DocumentConverter, ExportSummary, FileSink, PandocConverter};
use course_weave::{ItemOutcome, WeaveError};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

const LISTING: &str = "https://lms.example.edu/courses/7/modules";

fn fast_config() -> Config {
    parse_config(
        r#"
        [browser]
        endpoint = "http://127.0.0.1:9222"

        [listing]
        url = "https://lms.example.edu/courses/7/modules"

        [timing]
        settle-ms = 0
        selector-timeout-ms = 1
        scroll-pause-ms = 0
        max-scroll-rounds = 10

        [output]
        html-path = "out/course_merged.html"
        "#,
    )
    .unwrap()
}

fn listing_page(anchors: &[(&str, &str)]) -> String {
    let items: String = anchors
        .iter()
        .map(|(href, label)| {
            format!("<li><a class=\"ig-title\" href=\"{}\">{}</a></li>", href, label)
        })
        .collect();
    format!(
        "<html><head><title>Modules</title></head><body>\
         <ul class=\"ig-list\">{}</ul></body></html>",
        items
    )
}

fn wiki_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{t} | Course</title></head><body>\
         <div id=\"wiki_page_show\"><h1>{t}</h1><div class=\"show-content\">{b}</div></div>\
         </body></html>",
        t = title,
        b = body
    )
}

fn listing_url() -> Url {
    Url::parse(LISTING).unwrap()
}

fn abs(path: &str) -> String {
    format!("https://lms.example.edu{}", path)
}

#[tokio::test]
async fn test_listing_dedup_and_file_stub() {
    let session = FakeSession::new()
        .with_page(
            LISTING,
            &listing_page(&[("/pages/a", "A"), ("/files/5", "Doc"), ("/pages/a", "A")]),
        )
        .with_page(&abs("/pages/a"), &wiki_page("Page A", "<p>Alpha</p>"));

    let mut exporter = Exporter::new(session, &fast_config());
    let outcome = exporter.export(&listing_url()).await.unwrap();

    let urls: Vec<&str> = outcome.items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec![abs("/pages/a"), abs("/files/5")]);

    let fragments = outcome.document.fragments();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].title(), "Page A");
    assert!(fragments[0].body_html().contains("<p>Alpha</p>"));

    assert_eq!(outcome.items[1].outcome, ItemOutcome::FileOrExternal);
    assert_eq!(fragments[1].title(), "5");
    assert!(fragments[1]
        .body_html()
        .contains(&format!("href=\"{}\"", abs("/files/5"))));

    // File items are never navigated to
    let session = exporter.into_session();
    assert!(!session.visits.contains(&abs("/files/5")));
}

#[tokio::test]
async fn test_fragments_follow_listing_order() {
    let mut session = FakeSession::new().with_page(
        LISTING,
        &listing_page(&[
            ("/pages/w3", "Week 3"),
            ("/pages/w1", "Week 1"),
            ("/pages/w2", "Week 2"),
        ]),
    );
    for week in ["w1", "w2", "w3"] {
        let path = format!("/pages/{}", week);
        session = session.with_page(&abs(&path), &wiki_page(week, "<p>notes</p>"));
    }

    let mut exporter = Exporter::new(session, &fast_config());
    let outcome = exporter.export(&listing_url()).await.unwrap();

    let titles: Vec<&str> = outcome
        .document
        .fragments()
        .iter()
        .map(|f| f.title())
        .collect();
    assert_eq!(titles, vec!["w3", "w1", "w2"]);

    let indices: Vec<usize> = outcome.items.iter().map(|i| i.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_third_selector_wins_over_later_matches() {
    let mut session = FakeSession::new();
    session.show(
        "<html><head><title>Syllabus</title></head><body>\
         <div id=\"content\"><div class=\"user_content\"><p>Grading policy</p></div></div>\
         <main><p>Other</p></main></body></html>",
    );
    assert_eq!(DEFAULT_CONTENT_SELECTORS[2], "#content .user_content");

    let extractor = ContentExtractor::with_defaults(Duration::from_millis(1));
    let fragment = extractor.extract(&mut session).await;

    assert_eq!(fragment.title(), "Syllabus");
    assert_eq!(fragment.body_html(), "<p>Grading policy</p>");
}

#[tokio::test]
async fn test_heading_overrides_document_title() {
    let mut session = FakeSession::new();
    session.show(
        "<html><head><title>Course Site</title></head><body>\
         <h1 class=\"page-title\">  Lab 2: Circuits  </h1><div id=\"content\"><p>x</p></div>\
         </body></html>",
    );

    let extractor = ContentExtractor::with_defaults(Duration::from_millis(1));
    let fragment = extractor.extract(&mut session).await;

    assert_eq!(fragment.title(), "Lab 2_ Circuits");
}

#[tokio::test]
async fn test_empty_page_becomes_capture_stub() {
    let session = FakeSession::new()
        .with_page(LISTING, &listing_page(&[("/quizzes/3", "Quiz 3")]))
        .with_page(
            &abs("/quizzes/3"),
            "<html><head><title>Quiz 3</title></head><body>   </body></html>",
        );

    let mut exporter = Exporter::new(session, &fast_config());
    let outcome = exporter.export(&listing_url()).await.unwrap();

    assert_eq!(outcome.items[0].outcome, ItemOutcome::CaptureFailed);
    let fragment = &outcome.document.fragments()[0];
    assert_eq!(fragment.title(), "Quiz 3");
    assert!(fragment.body_html().contains(&abs("/quizzes/3")));
}

#[tokio::test]
async fn test_navigation_failure_does_not_stop_the_run() {
    let session = FakeSession::new()
        .with_page(
            LISTING,
            &listing_page(&[
                ("/pages/one", "One"),
                ("/pages/two", "Two"),
                ("/pages/three", "Three"),
            ]),
        )
        .with_page(&abs("/pages/one"), &wiki_page("One", "<p>1</p>"))
        .with_failing(&abs("/pages/two"))
        .with_page(&abs("/pages/three"), &wiki_page("Three", "<p>3</p>"));

    let mut exporter = Exporter::new(session, &fast_config());
    let outcome = exporter.export(&listing_url()).await.unwrap();

    let kinds: Vec<ItemOutcome> = outcome.items.iter().map(|i| i.outcome).collect();
    assert_eq!(
        kinds,
        vec![
            ItemOutcome::Extracted,
            ItemOutcome::CaptureFailed,
            ItemOutcome::Extracted
        ]
    );

    let stub = &outcome.document.fragments()[1];
    assert_eq!(stub.title(), "two");
    assert!(stub.body_html().contains(&abs("/pages/two")));
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let session = FakeSession::new().with_failing(LISTING);

    let mut exporter = Exporter::new(session, &fast_config());
    let err = exporter.export(&listing_url()).await.unwrap_err();

    assert!(matches!(err, WeaveError::Listing { .. }));
}

#[tokio::test]
async fn test_custom_selectors_replace_defaults() {
    let mut config = fast_config();
    config.extraction.content_selectors = Some(vec![".lesson-body".to_string()]);

    let session = FakeSession::new()
        .with_page(LISTING, &listing_page(&[("/pages/l1", "Lesson")]))
        .with_page(
            &abs("/pages/l1"),
            "<html><head><title>Lesson</title></head><body>\
             <div id=\"content\"><p>chrome</p>\
             <section class=\"lesson-body\"><p>core</p></section></div>\
             </body></html>",
        );

    let mut exporter = Exporter::new(session, &config);
    let outcome = exporter.export(&listing_url()).await.unwrap();

    assert_eq!(outcome.document.fragments()[0].body_html(), "<p>core</p>");
}

#[tokio::test]
async fn test_export_is_repeatable() {
    let session = FakeSession::new()
        .with_page(
            LISTING,
            &listing_page(&[("/pages/a", "A"), ("/files/9/download", "Slides")]),
        )
        .with_page(&abs("/pages/a"), &wiki_page("A", "<p>same</p>"));

    let mut exporter = Exporter::new(session, &fast_config());
    let first = exporter.export(&listing_url()).await.unwrap();
    let second = exporter.export(&listing_url()).await.unwrap();

    assert_eq!(first.document.render(), second.document.render());
}

#[tokio::test]
async fn test_collect_resolves_relative_hrefs() {
    let mut session = FakeSession::new();
    session.show(&listing_page(&[
        ("items/1", "Relative"),
        ("", "No href"),
        ("https://other.example.org/x", "Absolute"),
    ]));

    let urls = collect_item_urls(
        &mut session,
        &Url::parse("https://lms.example.edu/courses/7/modules/").unwrap(),
        &fast_config().timing,
    )
    .await
    .unwrap();

    let urls: Vec<String> = urls.into_iter().map(String::from).collect();
    assert_eq!(
        urls,
        vec![
            "https://lms.example.edu/courses/7/modules/items/1".to_string(),
            "https://other.example.org/x".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_scroll_stops_when_height_settles() {
    let mut session = FakeSession::new().with_heights(&[1000, 1500, 2000, 2000]);
    let grew = scroll_to_end(&mut session, 900, Duration::ZERO, 50)
        .await
        .unwrap();

    assert!(grew);
    assert_eq!(session.scrolls, 3);
}

#[tokio::test]
async fn test_scroll_on_static_page_reports_no_growth() {
    let mut session = FakeSession::new().with_heights(&[800]);
    let grew = scroll_to_end(&mut session, 900, Duration::ZERO, 50)
        .await
        .unwrap();

    assert!(!grew);
    assert_eq!(session.scrolls, 1);
}

#[tokio::test]
async fn test_scroll_is_bounded() {
    let timing = TimingConfig {
        max_scroll_rounds: 5,
        ..TimingConfig::default()
    };
    let mut session = FakeSession::new().growing_forever();
    let grew = scroll_to_end(&mut session, 900, Duration::ZERO, timing.max_scroll_rounds)
        .await
        .unwrap();

    assert!(grew);
    assert_eq!(session.scrolls, 5);
}

#[tokio::test]
async fn test_expand_clicks_first_available_control_only() {
    let mut session = FakeSession::new()
        .with_clickable(ElementTarget::Text("展开全部"))
        .with_clickable(ElementTarget::Css("[data-testid='expand-all']"));

    assert!(expand_all(&mut session).await.unwrap());
    assert_eq!(
        session.clicks,
        vec![
            ElementTarget::Text("Expand All"),
            ElementTarget::Text("展开全部")
        ]
    );
}

#[tokio::test]
async fn test_expand_without_controls_is_not_an_error() {
    let mut session = FakeSession::new();
    assert!(!expand_all(&mut session).await.unwrap());
    assert_eq!(session.clicks.len(), 5);
}

#[tokio::test]
async fn test_deliver_keeps_html_when_converter_missing() {
    let dir = TempDir::new().unwrap();
    let html_path = dir.path().join("export").join("course_merged.html");
    let docx_path = dir.path().join("export").join("course_merged.docx");

    let session = FakeSession::new()
        .with_page(LISTING, &listing_page(&[("/pages/a", "A")]))
        .with_page(&abs("/pages/a"), &wiki_page("A", "<p>body</p>"));
    let mut exporter = Exporter::new(session, &fast_config());
    let outcome = exporter.export(&listing_url()).await.unwrap();

    let sink = FileSink::new(&html_path);
    let converter: &dyn DocumentConverter = &PandocConverter::new("course-weave-missing-pandoc");
    let mut summary = ExportSummary::new(LISTING, chrono::Utc::now());
    deliver(
        &outcome.document,
        &sink,
        Some((converter, docx_path.as_path())),
        &mut summary,
    )
    .await
    .unwrap();

    let written = std::fs::read_to_string(&html_path).unwrap();
    assert!(written.starts_with("<!doctype html>"));
    assert!(written.contains(&format!("<base href='{}'>", LISTING)));
    assert!(written.contains("<p>body</p>"));
    assert_eq!(summary.html_path.as_deref(), Some(html_path.as_path()));
    assert!(summary.converted_path.is_none());
    assert!(summary
        .conversion_error
        .unwrap()
        .contains("course-weave-missing-pandoc"));
}
