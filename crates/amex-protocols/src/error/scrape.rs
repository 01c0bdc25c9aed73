//! Top-level scraper errors.

use thiserror::Error;

use super::{DriverError, ParseError};
use crate::types::{LoginStep, SessionState, ViewKind};

/// Every failure a scraping operation can surface.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Missing or empty credentials; raised before any driver call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A step of the login sequence failed. Terminal for the session.
    #[error("Login failed at step '{step}': {source}")]
    Login {
        step: LoginStep,
        #[source]
        source: DriverError,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A required view element never appeared or an auxiliary DOM step failed.
    #[error("Extraction of {view} failed: {reason}")]
    Extraction { view: ViewKind, reason: String },

    /// The session deadline or a sequence timeout expired.
    #[error("Timed out during {0}")]
    Timeout(String),

    #[error("Cancelled during {0}")]
    Cancelled(String),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: String,
        state: SessionState,
    },
}

/// Coarse classification of [`ScrapeError`] for callers that only branch on category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Login,
    Parse,
    Extraction,
    Timeout,
    Cancelled,
    Driver,
    InvalidState,
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Login { .. } => ErrorKind::Login,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Driver(_) => ErrorKind::Driver,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
        }
    }

    pub fn extraction(view: ViewKind, reason: impl Into<String>) -> Self {
        Self::Extraction {
            view,
            reason: reason.into(),
        }
    }
}
