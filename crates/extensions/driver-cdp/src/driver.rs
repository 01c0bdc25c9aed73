//! [`DomDriver`] over a single CDP page.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use amex_protocols::{DomDriver, DomNode, DriverError};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cdp::{CdpClient, CdpError, PageSession};
use crate::scripts;

/// Drives one browser tab.
pub struct CdpDriver {
    client: Arc<CdpClient>,
    page: PageSession,
    load_timeout: Duration,
    closed: AtomicBool,
}

impl CdpDriver {
    /// Connect to the browser at `endpoint` and open a fresh tab.
    pub async fn connect(endpoint: &str, request_timeout: Duration) -> Result<Self, CdpError> {
        let client = Arc::new(CdpClient::connect(endpoint, request_timeout).await?);
        let page = client.new_page().await?;
        debug!(target_id = page.target_id(), "Opened page");
        Ok(Self::new(client, page, request_timeout))
    }

    /// Wrap an already attached page. `load_timeout` bounds the
    /// ready-state wait after each navigation.
    pub fn new(client: Arc<CdpClient>, page: PageSession, load_timeout: Duration) -> Self {
        Self {
            client,
            page,
            load_timeout,
            closed: AtomicBool::new(false),
        }
    }

    pub fn page(&self) -> &PageSession {
        &self.page
    }

    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl DomDriver for CdpDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.page.navigate(url, self.load_timeout).await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        Ok(self.page.click_selector(selector).await?)
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        self.ensure_open()?;
        Ok(self.page.wait_visible(selector, timeout).await?)
    }

    async fn send_keys(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        Ok(self.page.fill(selector, text).await?)
    }

    async fn extract_text(&self, selector: &str) -> Result<Vec<String>, DriverError> {
        self.ensure_open()?;
        let value = self.page.evaluate(&scripts::text_of_all(selector)).await?;
        text_list(value)
    }

    async fn extract_nodes(&self, selector: &str) -> Result<Vec<DomNode>, DriverError> {
        self.ensure_open()?;

        let mut nodes = Vec::new();
        for node_id in self.page.query_selector_all(selector).await? {
            let mut node = DomNode::new(node_id);
            for (name, value) in self.page.get_attributes(node_id).await? {
                node = node.with_attribute(name, value);
            }
            nodes.push(node);
        }
        Ok(nodes)
    }

    async fn evaluate_script(&self, script: &str) -> Result<Value, DriverError> {
        self.ensure_open()?;
        Ok(self.page.evaluate(script).await?)
    }

    async fn close(&self) -> Result<(), DriverError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Err(e) = self.client.close_page(self.page.target_id()).await {
            warn!(target_id = self.page.target_id(), "Failed to close page: {}", e);
            return Err(e.into());
        }
        debug!(target_id = self.page.target_id(), "Closed page");
        Ok(())
    }
}

/// Decode the array returned by the text extraction script.
fn text_list(value: Value) -> Result<Vec<String>, DriverError> {
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect()),
        other => Err(DriverError::Script(format!(
            "expected an array of strings, got {}",
            other
        ))),
    }
}
