//! Raw field parsing errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty amount")]
    EmptyAmount,

    #[error("Invalid amount {raw:?}: {reason}")]
    InvalidAmount { raw: String, reason: String },

    #[error("Invalid date {raw:?}: {reason}")]
    InvalidDate { raw: String, reason: String },

    #[error("Unknown month {month:?} in date {raw:?}")]
    UnknownMonth { raw: String, month: String },

    #[error("Expected {expected} fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },
}

impl ParseError {
    pub fn invalid_amount(raw: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_date(raw: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDate {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}
