//! Normalized account records.

use serde::{Deserialize, Serialize};

/// Account-level balance snapshot, all values in pence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub available_credit: i64,
    pub statement_balance: i64,
    pub total_balance: i64,
}

/// A single card transaction.
///
/// `id` is only as unique as its [`IdentitySource`]: a derived id collides
/// for two real transactions sharing date, description and amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Signed amount in pence. Negative for credits and refunds.
    pub amount: i64,
    /// `DD-MM` or `DD-MM-YY`.
    pub date: String,
    pub description: String,
    pub id: String,
}

/// Origin of a transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum IdentitySource {
    /// Fingerprint of the raw scraped date, description and amount.
    Derived(String),
    /// Row identifier exposed by the page itself.
    Native(String),
}

impl IdentitySource {
    pub fn into_id(self) -> String {
        match self {
            Self::Derived(id) | Self::Native(id) => id,
        }
    }
}

/// Which rows of the transactions view to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionFilter {
    /// Only rows still awaiting settlement.
    PendingOnly,
    /// Every row in the recent activity table.
    RecentAll,
}

impl TransactionFilter {
    pub fn is_pending_only(self) -> bool {
        self == Self::PendingOnly
    }
}

impl std::fmt::Display for TransactionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PendingOnly => write!(f, "pending"),
            Self::RecentAll => write!(f, "recent"),
        }
    }
}
