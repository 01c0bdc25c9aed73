//! CDP error types.

use amex_protocols::DriverError;
use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not running with remote debugging at the endpoint.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("Chrome not found. Install Chrome or Chromium, or set browser.chrome_path")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned by the browser.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error during endpoint discovery.
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for DriverError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::NavigationFailed(msg) => DriverError::Navigation(msg),
            CdpError::ElementNotFound(msg) => DriverError::ElementNotFound(msg),
            CdpError::Timeout(msg) => DriverError::Timeout(msg),
            CdpError::JavaScript(msg) => DriverError::Script(msg),
            CdpError::SessionClosed => DriverError::Closed,
            CdpError::Protocol { .. }
            | CdpError::Serialization(_)
            | CdpError::InvalidResponse(_) => DriverError::Protocol(e.to_string()),
            CdpError::ConnectionFailed(_)
            | CdpError::ChromeNotAvailable(_)
            | CdpError::ChromeNotFound
            | CdpError::LaunchFailed(_)
            | CdpError::WebSocket(_)
            | CdpError::Http(_) => DriverError::Connection(e.to_string()),
        }
    }
}
