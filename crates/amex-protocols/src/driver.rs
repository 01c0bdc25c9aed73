//! DOM driver capability trait.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DriverError;

/// A matched DOM element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomNode {
    /// Driver-specific node handle.
    pub node_id: i64,
    /// Element attributes by name.
    pub attributes: HashMap<String, String>,
}

impl DomNode {
    pub fn new(node_id: i64) -> Self {
        Self {
            node_id,
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Browser primitives the scraper needs.
///
/// One driver backs exactly one navigable page. Calls are issued
/// sequentially by the session that owns the driver; implementations do not
/// need to support concurrent calls.
#[async_trait]
pub trait DomDriver: Send + Sync {
    /// Load `url` and wait until the document is interactive.
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<(), DriverError>;

    /// Wait until an element matching `selector` is rendered and visible.
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Type `text` into the first element matching `selector`.
    async fn send_keys(&self, selector: &str, text: &str) -> Result<(), DriverError>;

    /// Text content of every element matching `selector`, in document order.
    async fn extract_text(&self, selector: &str) -> Result<Vec<String>, DriverError>;

    /// Every element matching `selector`, in document order.
    async fn extract_nodes(&self, selector: &str) -> Result<Vec<DomNode>, DriverError>;

    /// Evaluate a script in the page and return its JSON value.
    async fn evaluate_script(&self, script: &str) -> Result<Value, DriverError>;

    /// Release the browsing context. Further calls may fail with [`DriverError::Closed`].
    async fn close(&self) -> Result<(), DriverError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
