//! DOM driver errors.

use thiserror::Error;

/// Errors reported by a [`DomDriver`](crate::DomDriver) implementation.
///
/// These are passed through to callers as-is; the scraping core never
/// reinterprets a driver failure as a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Browser context closed")]
    Closed,
}

impl DriverError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
