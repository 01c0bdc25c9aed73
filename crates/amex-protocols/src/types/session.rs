//! Session lifecycle vocabulary.

use serde::{Deserialize, Serialize};

/// Lifecycle of an authenticated browsing session.
///
/// Transitions only move forward; a `Closed` session is never revived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Closed,
}

impl SessionState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Unauthenticated, Authenticating)
                | (Authenticating, Authenticated)
                | (Authenticating, Closed)
                | (Authenticated, Closed)
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Individual steps of the login sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStep {
    OpenLoginPage,
    DismissCookieNotice,
    WaitForForm,
    EnterUserId,
    EnterPassword,
    Submit,
    AwaitLanding,
}

impl std::fmt::Display for LoginStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OpenLoginPage => "open login page",
            Self::DismissCookieNotice => "dismiss cookie notice",
            Self::WaitForForm => "wait for login form",
            Self::EnterUserId => "enter user ID",
            Self::EnterPassword => "enter password",
            Self::Submit => "submit login",
            Self::AwaitLanding => "await landing page",
        };
        f.write_str(s)
    }
}

/// Data views the extractor knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Overview,
    Transactions,
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overview => f.write_str("overview"),
            Self::Transactions => f.write_str("transactions"),
        }
    }
}
