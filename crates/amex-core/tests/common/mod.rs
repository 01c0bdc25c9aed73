//! Scripted in-memory driver shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use amex_config::ScraperConfig;
use amex_protocols::{DomDriver, DomNode, DriverError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

/// A driver call as the fake saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Navigate(String),
    Click(String),
    WaitVisible(String),
    SendKeys(String, String),
    ExtractText(String),
    ExtractNodes(String),
    Evaluate(String),
    Close,
}

#[derive(Default)]
struct Inner {
    texts: Mutex<HashMap<String, Vec<String>>>,
    nodes: Mutex<HashMap<String, Vec<DomNode>>>,
    invisible: Mutex<HashSet<String>>,
    failures: Mutex<HashMap<String, DriverError>>,
    hangs: Mutex<HashSet<String>>,
    script_result: Mutex<Option<Value>>,
    calls: Mutex<Vec<Call>>,
}

/// Driver backed by canned answers.
///
/// Every selector is visible unless hidden with [`FakeDriver::hide`].
/// Clones share state, so a test can keep a handle after giving the driver
/// to a session.
#[derive(Clone, Default)]
pub struct FakeDriver {
    inner: Arc<Inner>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, selector: &str, texts: &[&str]) -> Self {
        self.inner
            .texts
            .lock()
            .insert(selector.to_string(), texts.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_nodes(self, selector: &str, nodes: Vec<DomNode>) -> Self {
        self.inner.nodes.lock().insert(selector.to_string(), nodes);
        self
    }

    /// `wait_visible` on `selector` times out at once.
    pub fn hide(self, selector: &str) -> Self {
        self.inner.invisible.lock().insert(selector.to_string());
        self
    }

    /// Any call targeting `target` (selector or URL) fails with `error`.
    pub fn fail_on(self, target: &str, error: DriverError) -> Self {
        self.inner.failures.lock().insert(target.to_string(), error);
        self
    }

    /// Any call targeting `target` never completes.
    pub fn hang_on(self, target: &str) -> Self {
        self.inner.hangs.lock().insert(target.to_string());
        self
    }

    pub fn with_script_result(self, value: Value) -> Self {
        *self.inner.script_result.lock() = Some(value);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().clone()
    }

    pub fn was_closed(&self) -> bool {
        self.calls().contains(&Call::Close)
    }

    async fn enter(&self, call: Call, target: &str) -> Result<(), DriverError> {
        self.inner.calls.lock().push(call);

        if let Some(error) = self.inner.failures.lock().get(target).cloned() {
            return Err(error);
        }
        let hangs = self.inner.hangs.lock().contains(target);
        if hangs {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

#[async_trait]
impl DomDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.enter(Call::Navigate(url.to_string()), url).await
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        self.enter(Call::Click(selector.to_string()), selector).await
    }

    async fn wait_visible(&self, selector: &str, _timeout: Duration) -> Result<(), DriverError> {
        self.enter(Call::WaitVisible(selector.to_string()), selector).await?;
        if self.inner.invisible.lock().contains(selector) {
            return Err(DriverError::Timeout(format!("waiting for {}", selector)));
        }
        Ok(())
    }

    async fn send_keys(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.enter(Call::SendKeys(selector.to_string(), text.to_string()), selector)
            .await
    }

    async fn extract_text(&self, selector: &str) -> Result<Vec<String>, DriverError> {
        self.enter(Call::ExtractText(selector.to_string()), selector).await?;
        Ok(self.inner.texts.lock().get(selector).cloned().unwrap_or_default())
    }

    async fn extract_nodes(&self, selector: &str) -> Result<Vec<DomNode>, DriverError> {
        self.enter(Call::ExtractNodes(selector.to_string()), selector).await?;
        Ok(self.inner.nodes.lock().get(selector).cloned().unwrap_or_default())
    }

    async fn evaluate_script(&self, script: &str) -> Result<Value, DriverError> {
        self.enter(Call::Evaluate(script.to_string()), script).await?;
        Ok(self.inner.script_result.lock().clone().unwrap_or(Value::Bool(true)))
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.inner.calls.lock().push(Call::Close);
        Ok(())
    }
}

/// One scraped table row: date, description, amount, type.
pub struct Row<'a> {
    pub date: &'a str,
    pub description: &'a str,
    pub amount: &'a str,
    pub kind: &'a str,
    pub native_id: Option<&'a str>,
}

impl<'a> Row<'a> {
    pub fn new(date: &'a str, description: &'a str, amount: &'a str, kind: &'a str) -> Self {
        Self {
            date,
            description,
            amount,
            kind,
            native_id: None,
        }
    }

    pub fn with_native_id(mut self, id: &'a str) -> Self {
        self.native_id = Some(id);
        self
    }
}

/// Config with a status column at position 4 and native ids read from
/// `data-id`.
pub fn test_config() -> ScraperConfig {
    let mut config = ScraperConfig::default();
    config.transactions.columns.kind = Some(4);
    config.transactions.native_id_attribute = Some("data-id".to_string());
    config
}

/// Lay `rows` out in `driver` the way the transactions table renders them.
pub fn with_table(mut driver: FakeDriver, config: &ScraperConfig, rows: &[Row<'_>]) -> FakeDriver {
    let tx = &config.transactions;
    let cols = &tx.columns;
    let mut nodes = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let n = index + 1;
        let mut node = DomNode::new(100 + n as i64);
        if let Some(id) = row.native_id {
            node = node.with_attribute("data-id", id);
        }
        nodes.push(node);

        driver = driver
            .with_text(&tx.cell_selector(n, cols.date), &[row.date])
            .with_text(&tx.cell_selector(n, cols.description), &[row.description])
            .with_text(&tx.cell_selector(n, cols.amount), &[row.amount]);
        if let Some(kind) = cols.kind {
            driver = driver.with_text(&tx.cell_selector(n, kind), &[row.kind]);
        }
    }

    driver.with_nodes(&tx.rows, nodes)
}

pub fn with_summary(driver: FakeDriver, config: &ScraperConfig, values: &[&str]) -> FakeDriver {
    driver.with_text(&config.overview.summary_values, values)
}
