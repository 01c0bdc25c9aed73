//! Browser connection: HTTP discovery plus one multiplexed WebSocket.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpRequest, CdpResponse, NewTarget};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type Waiters = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;

/// Command channel shared by the client and every page it attaches.
///
/// Responses are matched to callers by request id, so commands from several
/// pages can be in flight on the one socket.
pub(crate) struct Transport {
    sink: tokio::sync::Mutex<WsSink>,
    next_id: AtomicU64,
    waiters: Waiters,
    request_timeout: Duration,
}

impl Transport {
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = serde_json::to_string(&CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        })?;
        trace!(id, method, "CDP send");

        let (tx, rx) = oneshot::channel();
        self.waiters.lock().insert(id, tx);

        let sent = self.sink.lock().await.send(Message::Text(frame.into())).await;
        if let Err(e) = sent {
            self.waiters.lock().remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => result,
            // Sender dropped: the socket went away.
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.waiters.lock().remove(&id);
                Err(CdpError::Timeout(format!(
                    "{} got no answer within {:?}",
                    method, self.request_timeout
                )))
            }
        }
    }
}

/// Hand one incoming frame to whoever is waiting on its id.
fn dispatch(text: &str, waiters: &Waiters) {
    let response = match serde_json::from_str::<CdpResponse>(text) {
        Ok(response) => response,
        Err(e) => {
            warn!("Unreadable CDP frame: {}", e);
            return;
        }
    };

    // Events are not subscribed to.
    let Some(id) = response.id else {
        return;
    };
    let Some(waiter) = waiters.lock().remove(&id) else {
        trace!(id, "Response for a caller that gave up");
        return;
    };

    let outcome = match response.error {
        Some(error) => Err(CdpError::Protocol {
            code: error.code,
            message: error.message,
        }),
        None => Ok(response.result.unwrap_or(Value::Null)),
    };
    let _ = waiter.send(outcome);
}

/// Connection to one Chrome instance.
pub struct CdpClient {
    http_endpoint: String,
    http: reqwest::Client,
    transport: Arc<Transport>,
    reader: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome's debugging endpoint, e.g. `http://localhost:9222`.
    ///
    /// `request_timeout` bounds the discovery request and every command sent
    /// afterwards.
    pub async fn connect(endpoint: &str, request_timeout: Duration) -> Result<Self, CdpError> {
        let http_endpoint = url::Url::parse(endpoint)?
            .as_str()
            .trim_end_matches('/')
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| CdpError::ConnectionFailed(e.to_string()))?;

        let unavailable =
            |e: reqwest::Error| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e));
        let version: BrowserVersion = http
            .get(format!("{}/json/version", http_endpoint))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        let (socket, _) = tokio_tungstenite::connect_async(version.web_socket_debugger_url.as_str())
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;
        debug!(browser = %version.browser, "Connected over CDP");

        let (sink, source) = socket.split();
        let waiters: Waiters = Arc::new(Mutex::new(HashMap::new()));
        let reader = tokio::spawn(Self::read_frames(source, waiters.clone()));

        Ok(Self {
            http_endpoint,
            http,
            transport: Arc::new(Transport {
                sink: tokio::sync::Mutex::new(sink),
                next_id: AtomicU64::new(1),
                waiters,
                request_timeout,
            }),
            reader,
        })
    }

    async fn read_frames(mut source: WsSource, waiters: Waiters) {
        while let Some(frame) = source.next().await {
            match frame {
                Ok(Message::Text(text)) => dispatch(&text, &waiters),
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("CDP socket error: {}", e);
                    break;
                }
            }
        }

        debug!("CDP socket closed");
        // Dropping the senders fails every outstanding call with SessionClosed.
        waiters.lock().clear();
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, CdpError> {
        self.transport.call(method, Some(params), None).await
    }

    /// Open a blank tab and attach to it.
    pub async fn new_page(&self) -> Result<PageSession, CdpError> {
        // Chrome rejects GET on /json/new.
        let target: NewTarget = self
            .http
            .put(format!("{}/json/new", self.http_endpoint))
            .send()
            .await?
            .json()
            .await?;
        debug!(target_id = %target.id, "Created tab");

        self.attach_page(&target.id).await
    }

    /// Attach to an existing tab with a flattened session.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                json!({"targetId": target_id, "flatten": true}),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| {
                CdpError::InvalidResponse("attachToTarget returned no sessionId".to_string())
            })?;

        let page = PageSession::new(
            target_id.to_string(),
            session_id.to_string(),
            self.transport.clone(),
        );
        page.enable_domains().await?;
        Ok(page)
    }

    pub async fn close_page(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", json!({"targetId": target_id}))
            .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waiter(waiters: &Waiters, id: u64) -> oneshot::Receiver<Result<Value, CdpError>> {
        let (tx, rx) = oneshot::channel();
        waiters.lock().insert(id, tx);
        rx
    }

    #[tokio::test]
    async fn test_dispatch_routes_result_by_id() {
        let waiters: Waiters = Arc::default();
        let first = waiter(&waiters, 1);
        let second = waiter(&waiters, 2);

        dispatch(r#"{"id": 2, "result": {"nodeId": 5}}"#, &waiters);

        assert_eq!(second.await.unwrap().unwrap()["nodeId"], 5);
        assert_eq!(waiters.lock().len(), 1);
        drop(first);
    }

    #[tokio::test]
    async fn test_dispatch_protocol_error() {
        let waiters: Waiters = Arc::default();
        let rx = waiter(&waiters, 9);

        dispatch(r#"{"id": 9, "error": {"code": -32000, "message": "Node not found"}}"#, &waiters);

        let err = rx.await.unwrap().unwrap_err();
        assert!(matches!(err, CdpError::Protocol { code: -32000, .. }));
    }

    #[test]
    fn test_dispatch_ignores_events_and_garbage() {
        let waiters: Waiters = Arc::default();
        let _rx = waiter(&waiters, 1);

        dispatch(r#"{"method": "Page.loadEventFired", "params": {}}"#, &waiters);
        dispatch("not json", &waiters);
        dispatch(r#"{"id": 42, "result": {}}"#, &waiters);

        assert!(waiters.lock().contains_key(&1));
    }
}
