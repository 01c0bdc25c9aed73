//! One-object client over a single session.

use std::sync::Arc;

use amex_config::ScraperConfig;
use amex_protocols::{DomDriver, Overview, ScrapeError, SessionState, Transaction};
use tokio_util::sync::CancellationToken;

use crate::session::{Session, SessionController};
use crate::views::ViewExtractor;

/// Logs in on construction and keeps the session for later reads.
///
/// Not for concurrent use: each method takes `&mut self`. Build one client
/// per driver for parallel retrieval.
pub struct AmexClient<D: DomDriver> {
    session: Session<D>,
    views: ViewExtractor,
}

impl<D: DomDriver> AmexClient<D> {
    /// Validate credentials, then log in on `driver`.
    ///
    /// Empty credentials fail with [`ScrapeError::Config`] before the driver
    /// is used.
    pub async fn connect(
        user_id: impl Into<String>,
        password: impl Into<String>,
        config: impl Into<Arc<ScraperConfig>>,
        driver: D,
    ) -> Result<Self, ScrapeError> {
        let controller = SessionController::new(user_id, password, config)?;
        Self::connect_with(&controller, driver, CancellationToken::new()).await
    }

    /// Log in through an existing controller, abortable through `cancel`.
    pub async fn connect_with(
        controller: &SessionController,
        driver: D,
        cancel: CancellationToken,
    ) -> Result<Self, ScrapeError> {
        let session = controller.login_with_cancel(driver, cancel).await?;
        Ok(Self {
            session,
            views: ViewExtractor::new(Arc::clone(controller.config())),
        })
    }

    pub async fn overview(&mut self) -> Result<Overview, ScrapeError> {
        self.views.get_overview(&mut self.session).await
    }

    pub async fn pending_transactions(&mut self) -> Result<Vec<Transaction>, ScrapeError> {
        self.views.get_pending_transactions(&mut self.session).await
    }

    pub async fn recent_transactions(&mut self) -> Result<Vec<Transaction>, ScrapeError> {
        self.views.get_recent_transactions(&mut self.session).await
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.session.cancel_token()
    }

    pub fn session(&self) -> &Session<D> {
        &self.session
    }

    pub async fn close(&mut self) {
        self.session.close().await;
    }
}
