//! The page session handle.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cdp::client::Transport;
use crate::cdp::error::CdpError;

/// One attached tab. Commands are routed to it by CDP session id over the
/// client's shared socket.
pub struct PageSession {
    pub(super) target_id: String,
    pub(super) session_id: String,
    pub(super) transport: Arc<Transport>,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, transport: Arc<Transport>) -> Self {
        Self {
            target_id,
            session_id,
            transport,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport.call(method, params, Some(&self.session_id)).await
    }

    /// Page, DOM and Runtime must be enabled before node ids and
    /// evaluation results are meaningful.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        for domain in ["Page", "DOM", "Runtime"] {
            self.call(&format!("{}.enable", domain), None).await?;
        }
        debug!(session_id = %self.session_id, "Page domains enabled");
        Ok(())
    }
}
