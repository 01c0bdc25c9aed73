//! Session controller: the login state machine and the session handle.
//!
//! A [`Session`] owns the driver for its whole life. Every driver call made
//! on its behalf goes through [`SessionControl::guard`], which races the call
//! against the caller's cancellation token, the session deadline and the
//! deadline of the current login or extraction sequence.

use std::future::Future;
use std::sync::Arc;

use amex_config::ScraperConfig;
use amex_protocols::{Credentials, DomDriver, DriverError, LoginStep, ScrapeError, SessionState};
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// Why a guarded driver call did not run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupt {
    Cancelled,
    SessionDeadline,
    SequenceDeadline,
}

impl Interrupt {
    pub(crate) fn into_error(self, operation: &str) -> ScrapeError {
        match self {
            Self::Cancelled => ScrapeError::Cancelled(operation.to_string()),
            Self::SessionDeadline => {
                ScrapeError::Timeout(format!("{} (session deadline reached)", operation))
            }
            Self::SequenceDeadline => ScrapeError::Timeout(operation.to_string()),
        }
    }
}

/// Lifecycle bookkeeping for a session, split from the driver so a driver
/// future and the guard can be borrowed at the same time.
pub(crate) struct SessionControl {
    id: Uuid,
    state: SessionState,
    cancel: CancellationToken,
    deadline: Option<Instant>,
    released: bool,
    span: Span,
}

impl SessionControl {
    fn new(cancel: CancellationToken, lifetime: Option<Duration>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            span: info_span!("session", %id),
            state: SessionState::Unauthenticated,
            cancel,
            deadline: lifetime.map(|d| Instant::now() + d),
            released: false,
        }
    }

    pub(crate) fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            warn!(from = %self.state, to = %next, "Ignoring illegal session transition");
            return;
        }
        debug!(from = %self.state, to = %next, "Session transition");
        self.state = next;
    }

    /// Run `fut` unless cancellation or a deadline wins the race first.
    ///
    /// Cancellation and the session deadline close the session; a sequence
    /// deadline only aborts the current call.
    pub(crate) async fn guard<T, F>(
        &mut self,
        sequence_deadline: Option<Instant>,
        fut: F,
    ) -> Result<Result<T, DriverError>, Interrupt>
    where
        F: Future<Output = Result<T, DriverError>>,
    {
        let cancel = self.cancel.clone();
        let session_deadline = self.deadline;

        let outcome = if cancel.is_cancelled() {
            Err(Interrupt::Cancelled)
        } else {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(Interrupt::Cancelled),
                _ = sleep_until(session_deadline) => Err(Interrupt::SessionDeadline),
                _ = sleep_until(sequence_deadline) => Err(Interrupt::SequenceDeadline),
                res = fut => Ok(res),
            }
        };

        if let Err(Interrupt::Cancelled | Interrupt::SessionDeadline) = outcome {
            self.transition(SessionState::Closed);
        }
        outcome
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// An authenticated browsing context.
///
/// Obtained from [`SessionController::login`] and passed explicitly to every
/// [`ViewExtractor`](crate::ViewExtractor) call. Operations take `&mut self`,
/// so a session can only have one call in flight. For parallel retrieval,
/// log in several sessions on separate drivers.
pub struct Session<D: DomDriver> {
    driver: D,
    ctl: SessionControl,
}

impl<D: DomDriver> Session<D> {
    fn new(driver: D, cancel: CancellationToken, lifetime: Option<Duration>) -> Self {
        Self {
            driver,
            ctl: SessionControl::new(cancel, lifetime),
        }
    }

    /// Identifier recorded on this session's tracing span.
    pub fn id(&self) -> Uuid {
        self.ctl.id
    }

    pub fn state(&self) -> SessionState {
        self.ctl.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctl.state == SessionState::Authenticated
    }

    /// Token that aborts any in-flight step and closes the session when
    /// cancelled. Clone it into whichever task needs to cancel.
    pub fn cancel_token(&self) -> CancellationToken {
        self.ctl.cancel.clone()
    }

    /// When the session expires, if it has a lifetime.
    pub fn deadline(&self) -> Option<Instant> {
        self.ctl.deadline
    }

    /// Span that every operation on this session runs inside.
    pub(crate) fn span(&self) -> Span {
        self.ctl.span.clone()
    }

    pub(crate) fn parts(&mut self) -> (&D, &mut SessionControl) {
        (&self.driver, &mut self.ctl)
    }

    /// Fail unless the session is usable for `operation` right now.
    pub(crate) fn ensure_authenticated(&mut self, operation: &str) -> Result<(), ScrapeError> {
        if self.ctl.state == SessionState::Authenticated {
            if self.ctl.cancel.is_cancelled() {
                self.ctl.transition(SessionState::Closed);
                return Err(ScrapeError::Cancelled(operation.to_string()));
            }
            if self.ctl.deadline.is_some_and(|d| Instant::now() >= d) {
                self.ctl.transition(SessionState::Closed);
                return Err(Interrupt::SessionDeadline.into_error(operation));
            }
            return Ok(());
        }

        Err(ScrapeError::InvalidState {
            operation: operation.to_string(),
            state: self.ctl.state,
        })
    }

    /// Tear the session down and release the browsing context.
    ///
    /// Safe to call more than once; the driver is closed only the first time.
    pub async fn close(&mut self) {
        self.ctl.cancel.cancel();
        self.ctl.transition(SessionState::Closed);

        if self.ctl.released {
            return;
        }
        self.ctl.released = true;

        if let Err(e) = self.driver.close().await {
            warn!(session = %self.ctl.id, error = %e, "Failed to close browsing context");
        }
        info!(session = %self.ctl.id, "Session closed");
    }
}

/// Performs the login sequence and hands out [`Session`]s.
pub struct SessionController {
    credentials: Credentials,
    config: Arc<ScraperConfig>,
}

impl SessionController {
    /// Validate credentials without touching any driver.
    pub fn new(
        user_id: impl Into<String>,
        password: impl Into<String>,
        config: impl Into<Arc<ScraperConfig>>,
    ) -> Result<Self, ScrapeError> {
        let credentials = Credentials::new(user_id, password)?;
        Ok(Self::with_credentials(credentials, config))
    }

    pub fn with_credentials(
        credentials: Credentials,
        config: impl Into<Arc<ScraperConfig>>,
    ) -> Self {
        Self {
            credentials,
            config: config.into(),
        }
    }

    pub fn config(&self) -> &Arc<ScraperConfig> {
        &self.config
    }

    /// Log in on `driver`, returning an authenticated session.
    ///
    /// On failure the driver is closed and no session escapes.
    pub async fn login<D: DomDriver>(&self, driver: D) -> Result<Session<D>, ScrapeError> {
        self.login_with_cancel(driver, CancellationToken::new()).await
    }

    /// Like [`login`](Self::login), abortable through `cancel`. The same
    /// token stays attached to the resulting session.
    pub async fn login_with_cancel<D: DomDriver>(
        &self,
        driver: D,
        cancel: CancellationToken,
    ) -> Result<Session<D>, ScrapeError> {
        let mut session = Session::new(driver, cancel, self.config.timeouts.session());
        let span = session.span();

        async move {
            session.ctl.transition(SessionState::Authenticating);
            info!("Logging in");

            match self.run_login(&mut session).await {
                Ok(()) => {
                    session.ctl.transition(SessionState::Authenticated);
                    info!("Logged in");
                    Ok(session)
                }
                Err(e) => {
                    warn!(error = %e, "Login failed");
                    session.close().await;
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_login<D: DomDriver>(&self, session: &mut Session<D>) -> Result<(), ScrapeError> {
        let login = &self.config.login;
        let step_timeout = self.config.timeouts.step();
        let budget = self.config.timeouts.login();
        let sequence = Some(Instant::now() + budget);
        let (driver, ctl) = session.parts();

        login_step(
            ctl,
            sequence,
            LoginStep::OpenLoginPage,
            driver.navigate(&self.config.site.login_url),
        )
        .await?;

        if login.dismiss_cookie_notice {
            login_step(
                ctl,
                sequence,
                LoginStep::DismissCookieNotice,
                async {
                    driver.wait_visible(&login.cookie_notice, step_timeout).await?;
                    driver.click(&login.cookie_notice).await
                },
            )
            .await?;
        }

        login_step(
            ctl,
            sequence,
            LoginStep::WaitForForm,
            driver.wait_visible(&login.user_id_input, step_timeout),
        )
        .await?;

        login_step(
            ctl,
            sequence,
            LoginStep::EnterUserId,
            driver.send_keys(&login.user_id_input, self.credentials.user_id()),
        )
        .await?;

        login_step(
            ctl,
            sequence,
            LoginStep::EnterPassword,
            driver.send_keys(&login.password_input, self.credentials.password()),
        )
        .await?;

        login_step(ctl, sequence, LoginStep::Submit, driver.click(&login.submit)).await?;

        // The dashboard can take a while after submit; give the marker
        // whatever is left of the login budget.
        let remaining = sequence
            .map(|s| s.saturating_duration_since(Instant::now()))
            .unwrap_or(budget);
        login_step(
            ctl,
            sequence,
            LoginStep::AwaitLanding,
            driver.wait_visible(&login.landing_marker, remaining),
        )
        .await
    }
}

async fn login_step<T, F>(
    ctl: &mut SessionControl,
    sequence: Option<Instant>,
    step: LoginStep,
    fut: F,
) -> Result<T, ScrapeError>
where
    F: Future<Output = Result<T, DriverError>>,
{
    debug!(%step, "Login step");

    match ctl.guard(sequence, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(ScrapeError::Login { step, source }),
        Err(Interrupt::SequenceDeadline) => Err(ScrapeError::Login {
            step,
            source: DriverError::Timeout(
                "login did not complete within its time budget".to_string(),
            ),
        }),
        Err(interrupt) => Err(interrupt.into_error(&format!("login ({})", step))),
    }
}
