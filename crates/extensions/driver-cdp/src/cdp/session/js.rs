//! Script evaluation in the page.

use serde_json::{json, Value};

use crate::cdp::error::CdpError;

use super::core::PageSession;

impl PageSession {
    /// Evaluate `expression` in the page's main world, awaiting promises,
    /// and return the result as JSON.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let reply = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;
        Self::returned_value(reply)
    }

    fn returned_value(mut reply: Value) -> Result<Value, CdpError> {
        Self::check_exception(&reply)?;
        Ok(reply.pointer_mut("/result/value").map(Value::take).unwrap_or_default())
    }

    /// A thrown exception comes back as a successful reply carrying
    /// `exceptionDetails`.
    pub(super) fn check_exception(reply: &Value) -> Result<(), CdpError> {
        let Some(details) = reply.get("exceptionDetails") else {
            return Ok(());
        };

        let message = details["exception"]["description"]
            .as_str()
            .or_else(|| details["text"].as_str())
            .unwrap_or("script threw without a description");
        Err(CdpError::JavaScript(message.to_string()))
    }
}
