//! DOM operations for CDP page session.

use serde_json::json;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{attribute_pairs, BoxModel};

use super::core::PageSession;

impl PageSession {
    /// Node id of the document root.
    pub async fn document_node(&self) -> Result<i64, CdpError> {
        let result = self
            .call("DOM.getDocument", Some(json!({"depth": 0})))
            .await?;

        result["root"]["nodeId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("Missing root nodeId".to_string()))
    }

    /// First node matching `selector`.
    pub async fn query_selector(&self, selector: &str) -> Result<Option<i64>, CdpError> {
        let root = self.document_node().await?;

        let result = self
            .call(
                "DOM.querySelector",
                Some(json!({
                    "nodeId": root,
                    "selector": selector,
                })),
            )
            .await?;

        match result["nodeId"].as_i64().unwrap_or(0) {
            0 => Ok(None),
            node_id => Ok(Some(node_id)),
        }
    }

    /// Every node matching `selector`, in document order.
    pub async fn query_selector_all(&self, selector: &str) -> Result<Vec<i64>, CdpError> {
        let root = self.document_node().await?;

        let result = self
            .call(
                "DOM.querySelectorAll",
                Some(json!({
                    "nodeId": root,
                    "selector": selector,
                })),
            )
            .await?;

        let node_ids: Vec<i64> = result["nodeIds"]
            .as_array()
            .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default();

        Ok(node_ids)
    }

    /// Attributes of a node as name/value pairs.
    pub async fn get_attributes(&self, node_id: i64) -> Result<Vec<(String, String)>, CdpError> {
        let result = self
            .call("DOM.getAttributes", Some(json!({"nodeId": node_id})))
            .await?;

        let flat: Vec<String> = serde_json::from_value(result["attributes"].clone())?;
        Ok(attribute_pairs(&flat))
    }

    /// Box model for a node, `None` when it is not rendered.
    pub async fn get_box_model(&self, node_id: i64) -> Result<Option<BoxModel>, CdpError> {
        let result = self
            .call("DOM.getBoxModel", Some(json!({"nodeId": node_id})))
            .await;

        match result {
            Ok(r) => {
                let model: BoxModel = serde_json::from_value(r["model"].clone())?;
                Ok(Some(model))
            }
            Err(CdpError::Protocol { code: -32000, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn focus(&self, node_id: i64) -> Result<(), CdpError> {
        self.call("DOM.focus", Some(json!({"nodeId": node_id})))
            .await?;
        Ok(())
    }

    /// Click the centre of the first element matching `selector`.
    pub async fn click_selector(&self, selector: &str) -> Result<(), CdpError> {
        let node_id = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(selector.to_string()))?;

        let box_model = self
            .get_box_model(node_id)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(format!("{} (not visible)", selector)))?;

        let (x, y) = Self::quad_center(&box_model.content);
        self.click(x, y).await
    }

    /// Replace the value of the input matching `selector` with `value`.
    pub async fn fill(&self, selector: &str, value: &str) -> Result<(), CdpError> {
        let node_id = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(selector.to_string()))?;

        self.focus(node_id).await?;
        self.press_key_combo("Control+a").await?;
        self.type_text(value).await
    }

    pub(super) fn quad_center(quad: &[f64]) -> (f64, f64) {
        if quad.len() >= 8 {
            let x = (quad[0] + quad[2] + quad[4] + quad[6]) / 4.0;
            let y = (quad[1] + quad[3] + quad[5] + quad[7]) / 4.0;
            (x, y)
        } else {
            (0.0, 0.0)
        }
    }
}
