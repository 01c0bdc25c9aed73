//! Navigation and waiting for CDP page session.

use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::scripts;

use super::core::PageSession;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl PageSession {
    /// Navigate to `url` and wait until the document is interactive.
    pub async fn navigate(&self, url: &str, load_timeout: Duration) -> Result<String, CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(|e| e.as_str()) {
            return Err(CdpError::NavigationFailed(format!("{}: {}", url, error)));
        }

        let frame_id = result["frameId"].as_str().unwrap_or("main").to_string();

        self.wait_for_load(load_timeout).await?;

        debug!("Navigated to {}", url);
        Ok(frame_id)
    }

    /// Poll `document.readyState` until it is `interactive` or `complete`.
    pub async fn wait_for_load(&self, timeout: Duration) -> Result<(), CdpError> {
        let deadline = Instant::now() + timeout;

        loop {
            let state = self.evaluate("document.readyState").await?;
            if matches!(state.as_str(), Some("complete" | "interactive")) {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Poll until an element matching `selector` is rendered with a
    /// non-empty box and not hidden by style.
    pub async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<(), CdpError> {
        let deadline = Instant::now() + timeout;
        let check = scripts::is_visible(selector);

        loop {
            if self.evaluate(&check).await?.as_bool() == Some(true) {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(CdpError::Timeout(format!(
                    "'{}' not visible after {:?}",
                    selector, timeout
                )));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
