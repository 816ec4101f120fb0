//! Page loader
//!
//! Brings the session's tab to an extractable state:
//! - navigate and wait for the DOM to be parsed (bounded)
//! - pause so client-side frameworks can render
//! - wait for network quiescence, but never fail on it

use crate::browser::{BrowserResult, PageSession};
use crate::config::TimingConfig;
use url::Url;

/// Loads `url` into the session
///
/// Pages that poll or stream never go quiet, so a quiescence timeout is
/// logged and ignored. Navigation errors are returned untouched; there are
/// no retries.
pub async fn load_page<S: PageSession + ?Sized>(
    session: &mut S,
    url: &Url,
    timing: &TimingConfig,
) -> BrowserResult<()> {
    session.goto(url, timing.navigation_timeout()).await?;
    tokio::time::sleep(timing.settle()).await;
    settle_network(session, timing.quiescence_timeout()).await;
    Ok(())
}

/// Bounded quiescence wait that swallows timeouts and script failures
///
/// Returns whether the page actually went quiet.
pub async fn settle_network<S: PageSession + ?Sized>(
    session: &mut S,
    timeout: std::time::Duration,
) -> bool {
    match session.wait_for_quiescence(timeout).await {
        Ok(true) => true,
        Ok(false) => {
            tracing::debug!(
                "Network did not settle within {}ms, continuing",
                timeout.as_millis()
            );
            false
        }
        Err(e) => {
            tracing::debug!("Quiescence check failed, continuing: {}", e);
            false
        }
    }
}
