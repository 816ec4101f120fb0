//! DevTools endpoint discovery against a mock `/json/version`

use course_weave::browser::{discover_websocket_url, BrowserError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_discovers_websocket_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Browser": "Chrome/126.0.6478.126",
            "Protocol-Version": "1.3",
            "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/5f1e"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // A trailing slash on the endpoint must not produce `//json/version`
    let endpoint = format!("{}/", mock_server.uri());
    let ws_url = discover_websocket_url(&endpoint).await.unwrap();

    assert_eq!(ws_url, "ws://127.0.0.1:9222/devtools/browser/5f1e");
}

#[tokio::test]
async fn test_missing_websocket_key_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Browser": "Chrome" })),
        )
        .mount(&mock_server)
        .await;

    let err = discover_websocket_url(&mock_server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, BrowserError::MissingWebSocketUrl(_)));
}

#[tokio::test]
async fn test_error_status_is_an_endpoint_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = discover_websocket_url(&mock_server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, BrowserError::Endpoint { .. }));
}
