//! Chromium session over the DevTools protocol, using chromiumoxide.
//!
//! The browser is started by the user with remote debugging enabled; this
//! module only attaches to it and drives one tab.

use super::{BrowserError, BrowserResult, ElementTarget, PageSession, RawAnchor};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::handler::HandlerConfig;
use chromiumoxide::page::Page;
use chromiumoxide::Handler;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

/// Extra time granted to a script-side wait before the Rust side gives up on it
const SCRIPT_GRACE: Duration = Duration::from_secs(2);

/// How long already open tabs may take to show up after target discovery
const TAB_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);

const TAB_POLL_INTERVAL: Duration = Duration::from_millis(100);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Set on the outgoing document so the readiness poll never reads it
const STALE_MARKER: &str = "__courseWeaveStale";

const HEIGHT_SCRIPT: &str = "(document.scrollingElement || document.documentElement).scrollHeight";

/// Resolves the DevTools websocket URL for an endpoint
///
/// `ws://` and `wss://` endpoints are returned as-is. For `http(s)://host:port`
/// the browser's `/json/version` document is fetched and its
/// `webSocketDebuggerUrl` is returned.
///
/// chromiumoxide can resolve `http` endpoints itself; resolving here keeps a
/// missing or malformed `/json/version` distinguishable from a failed connect.
pub async fn discover_websocket_url(endpoint: &str) -> BrowserResult<String> {
    if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
        return Ok(endpoint.to_string());
    }

    let version_url = format!("{}/json/version", endpoint.trim_end_matches('/'));
    let endpoint_error = |source| BrowserError::Endpoint {
        endpoint: endpoint.to_string(),
        source,
    };

    let json: serde_json::Value = reqwest::get(&version_url)
        .await
        .map_err(endpoint_error)?
        .error_for_status()
        .map_err(endpoint_error)?
        .json()
        .await
        .map_err(endpoint_error)?;

    json["webSocketDebuggerUrl"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| BrowserError::MissingWebSocketUrl(endpoint.to_string()))
}

/// Handler settings for a session whose longest single command may take
/// `longest_wait`
///
/// chromiumoxide applies `request_timeout` to every command, navigations and
/// awaited scripts included, so it must cover the longest configured wait.
fn handler_config(longest_wait: Duration) -> HandlerConfig {
    HandlerConfig {
        request_timeout: longest_wait + SCRIPT_GRACE,
        ..HandlerConfig::default()
    }
}

/// Attaches to a running browser and returns a session on its first tab
///
/// `longest_wait` is the longest navigation or script wait the session will
/// be asked to perform. A new tab is opened when the browser has none.
pub async fn connect(endpoint: &str, longest_wait: Duration) -> BrowserResult<ChromiumSession> {
    let ws_url = discover_websocket_url(endpoint).await?;
    tracing::info!("Connecting to browser at {}", ws_url);

    let config = handler_config(longest_wait);
    let (mut browser, handler) = Browser::connect_with_config(ws_url, config)
        .await
        .map_err(|e| BrowserError::Connect(e.to_string()))?;
    let handler_task = spawn_handler_task(handler);

    let page = match existing_tab(&mut browser).await? {
        Some(page) => {
            tracing::debug!("Reusing an open tab");
            page
        }
        None => {
            tracing::debug!("No open tab, creating one");
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| BrowserError::Connect(e.to_string()))?
        }
    };

    Ok(ChromiumSession {
        _browser: browser,
        page,
        handler_task,
    })
}

/// Number of targets that are ordinary tabs
fn open_tab_count<'a>(target_kinds: impl IntoIterator<Item = &'a str>) -> usize {
    target_kinds.into_iter().filter(|kind| *kind == "page").count()
}

/// First tab that was already open before we attached
///
/// A freshly connected browser only tracks targets created after the
/// connection, so existing tabs are discovered explicitly and then awaited
/// until the handler has attached to them.
async fn existing_tab(browser: &mut Browser) -> BrowserResult<Option<Page>> {
    let targets = browser
        .fetch_targets()
        .await
        .map_err(|e| BrowserError::Connect(e.to_string()))?;
    let tabs = open_tab_count(targets.iter().map(|t| t.r#type.as_str()));
    tracing::debug!("Browser reports {} open tab(s)", tabs);
    if tabs == 0 {
        return Ok(None);
    }

    let deadline = Instant::now() + TAB_DISCOVERY_TIMEOUT;
    loop {
        let pages = browser
            .pages()
            .await
            .map_err(|e| BrowserError::Connect(e.to_string()))?;
        if let Some(page) = pages.into_iter().next() {
            return Ok(Some(page));
        }
        if Instant::now() >= deadline {
            tracing::warn!(
                "Open tabs were not attached within {}ms",
                TAB_DISCOVERY_TIMEOUT.as_millis()
            );
            return Ok(None);
        }
        tokio::time::sleep(TAB_POLL_INTERVAL).await;
    }
}

fn spawn_handler_task(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::warn!("chromiumoxide handler event error: {}", e);
            }
        }
        tracing::debug!("Browser connection closed");
    })
}

/// Maps the `errorText` of a `Page.navigate` reply
fn navigation_outcome(url: &Url, error_text: Option<&str>) -> BrowserResult<()> {
    match error_text {
        Some(message) if !message.is_empty() => Err(BrowserError::Navigation {
            url: url.to_string(),
            message: message.to_string(),
        }),
        _ => Ok(()),
    }
}

fn mark_stale_script() -> String {
    format!("(() => {{ window.{STALE_MARKER} = true; return true; }})()")
}

/// True once the new document has been parsed
fn dom_parsed_script() -> String {
    format!("(() => !window.{STALE_MARKER} && document.readyState !== 'loading')()")
}

/// A single attached Chromium tab
pub struct ChromiumSession {
    _browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    /// Stops driving the connection; the browser itself keeps running
    pub fn disconnect(self) {
        self.handler_task.abort();
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> BrowserResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Script(format!("unexpected script result: {e:?}")))
    }

    /// Navigates and returns once the new document is no longer `loading`
    ///
    /// Subresources such as images and iframes are not waited for.
    async fn navigate_until_parsed(&self, url: &Url) -> BrowserResult<()> {
        if let Err(e) = self.eval::<bool>(mark_stale_script()).await {
            tracing::trace!("Could not mark the outgoing document: {}", e);
        }

        let reply = self
            .page
            .execute(NavigateParams::new(url.as_str()))
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        navigation_outcome(url, reply.result.error_text.as_deref())?;

        // Same-document navigations carry no loader and keep the marker
        if reply.result.loader_id.is_none() {
            return Ok(());
        }

        loop {
            match self.eval::<bool>(dom_parsed_script()).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => tracing::trace!("Readiness check failed mid-navigation: {}", e),
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

/// Quotes a Rust string as a JavaScript string literal
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn click_script(target: ElementTarget) -> String {
    match target {
        ElementTarget::Css(selector) => format!(
            r#"(() => {{
                let el = null;
                try {{ el = document.querySelector({sel}); }} catch (_) {{ return false; }}
                if (!el) return false;
                el.click();
                return true;
            }})()"#,
            sel = js_string(selector)
        ),
        ElementTarget::Text(text) => format!(
            r#"(() => {{
                const wanted = {text}.toLowerCase();
                for (const el of document.querySelectorAll('body *')) {{
                    const own = Array.from(el.childNodes)
                        .filter(n => n.nodeType === Node.TEXT_NODE)
                        .map(n => n.textContent)
                        .join('')
                        .trim()
                        .toLowerCase();
                    if (own === wanted) {{
                        el.click();
                        return true;
                    }}
                }}
                return false;
            }})()"#,
            text = js_string(text)
        ),
        ElementTarget::ButtonWithText(text) => format!(
            r#"(() => {{
                const wanted = {text};
                const btn = Array.from(document.querySelectorAll('button'))
                    .find(b => (b.textContent || '').includes(wanted));
                if (!btn) return false;
                btn.click();
                return true;
            }})()"#,
            text = js_string(text)
        ),
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn goto(&mut self, url: &Url, timeout: Duration) -> BrowserResult<()> {
        match tokio::time::timeout(timeout, self.navigate_until_parsed(url)).await {
            Ok(result) => result,
            Err(_) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn wait_for_quiescence(&mut self, timeout: Duration) -> BrowserResult<bool> {
        // Heuristic: the resource entry count stays unchanged for idleMs
        // while the document reports readyState === 'complete'.
        let script = format!(
            r#"(async () => {{
                const timeoutMs = {timeout_ms};
                const idleMs = 500;
                const interval = 100;
                const start = Date.now();
                const count = () => {{
                    try {{
                        return performance.getEntriesByType('resource').length;
                    }} catch (_) {{
                        return 0;
                    }}
                }};
                let last = count();
                let stableMs = 0;
                while (Date.now() - start < timeoutMs) {{
                    await new Promise(r => setTimeout(r, interval));
                    const cur = count();
                    if (document.readyState === 'complete' && cur === last) {{
                        stableMs += interval;
                        if (stableMs >= idleMs) return true;
                    }} else {{
                        stableMs = 0;
                    }}
                    last = cur;
                }}
                return false;
            }})()"#,
            timeout_ms = timeout.as_millis()
        );

        match tokio::time::timeout(timeout + SCRIPT_GRACE, self.eval::<bool>(script)).await {
            Ok(result) => result,
            Err(_) => Ok(false),
        }
    }

    async fn document_height(&mut self) -> BrowserResult<u64> {
        let height: f64 = self.eval(HEIGHT_SCRIPT.to_string()).await?;
        Ok(height.max(0.0) as u64)
    }

    async fn scroll_by(&mut self, step: u32) -> BrowserResult<()> {
        let script = format!("(() => {{ window.scrollBy(0, {step}); return true; }})()");
        let _: bool = self.eval(script).await?;
        Ok(())
    }

    async fn click(&mut self, target: ElementTarget) -> BrowserResult<bool> {
        self.eval(click_script(target)).await
    }

    async fn anchors(&mut self, selectors: &[&str]) -> BrowserResult<Vec<RawAnchor>> {
        let script = format!(
            r#"(() => Array.from(document.querySelectorAll({sel})).map(a => ({{
                href: a.getAttribute('href') || '',
                text: (a.textContent || '').trim()
            }})))()"#,
            sel = js_string(&selectors.join(", "))
        );
        self.eval(script).await
    }

    async fn title(&mut self) -> BrowserResult<String> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> BrowserResult<bool> {
        let script = format!(
            r#"(async () => {{
                const timeoutMs = {timeout_ms};
                const start = Date.now();
                do {{
                    try {{
                        if (document.querySelector({sel})) return true;
                    }} catch (_) {{
                        return false;
                    }}
                    await new Promise(r => setTimeout(r, 100));
                }} while (Date.now() - start < timeoutMs);
                return false;
            }})()"#,
            timeout_ms = timeout.as_millis(),
            sel = js_string(selector)
        );

        match tokio::time::timeout(timeout + SCRIPT_GRACE, self.eval::<bool>(script)).await {
            Ok(result) => result,
            Err(_) => Ok(false),
        }
    }

    async fn inner_html(&mut self, selector: &str) -> BrowserResult<Option<String>> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? el.innerHTML : null;
            }})()"#,
            sel = js_string(selector)
        );
        self.eval(script).await
    }

    async fn text_content(&mut self, selector: &str) -> BrowserResult<Option<String>> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? el.textContent : null;
            }})()"#,
            sel = js_string(selector)
        );
        self.eval(script).await
    }

    async fn document_html(&mut self) -> BrowserResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }
}
