//! Login credentials.

use crate::error::ScrapeError;

/// User ID and password for the login form.
///
/// Both fields are checked once, here. The `Debug` output redacts both so a
/// stray `{:?}` in a log line cannot leak them.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user_id: String,
    password: String,
}

impl Credentials {
    /// Build credentials, rejecting empty or whitespace-only values.
    pub fn new(
        user_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ScrapeError> {
        let user_id = user_id.into();
        let password = password.into();

        if user_id.trim().is_empty() || password.trim().is_empty() {
            return Err(ScrapeError::Config(
                "both user ID and password must be provided".to_string(),
            ));
        }

        Ok(Self { user_id, password })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}
