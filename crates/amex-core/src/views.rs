//! View extractor: balances and transactions read from an authenticated
//! session.

use std::future::Future;
use std::sync::Arc;

use amex_config::{RowErrorPolicy, ScraperConfig};
use amex_protocols::{
    DomDriver, DriverError, Overview, ScrapeError, Transaction, TransactionFilter, ViewKind,
};
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn, Instrument};

use crate::identity::IdentityScheme;
use crate::parser::{parse_overview, parse_transaction};
use crate::scripts;
use crate::session::{Interrupt, Session, SessionControl};

/// Reads the overview and transactions views.
///
/// Holds only configuration; the session is passed to every call.
pub struct ViewExtractor {
    config: Arc<ScraperConfig>,
}

impl ViewExtractor {
    pub fn new(config: impl Into<Arc<ScraperConfig>>) -> Self {
        Self {
            config: config.into(),
        }
    }

    /// Read the three balance figures.
    ///
    /// Driver failures, including the summary never appearing, are returned
    /// as they are.
    pub async fn get_overview<D: DomDriver>(
        &self,
        session: &mut Session<D>,
    ) -> Result<Overview, ScrapeError> {
        session.ensure_authenticated("read overview")?;
        let span = session.span();

        async {
            let selector = &self.config.overview.summary_values;
            let sequence = Some(Instant::now() + self.config.timeouts.extraction());
            let (driver, ctl) = session.parts();

            if let Some(url) = &self.config.site.overview_url {
                step(ctl, sequence, "open overview", driver.navigate(url)).await?;
            }
            step(
                ctl,
                sequence,
                "wait for balance summary",
                driver.wait_visible(selector, self.config.timeouts.step()),
            )
            .await?;
            let values =
                step(ctl, sequence, "read balance summary", driver.extract_text(selector)).await?;
            debug!(count = values.len(), "Read balance summary");

            let overview = parse_overview(&values)?;
            info!("Overview retrieved");
            Ok::<_, ScrapeError>(overview)
        }
        .instrument(span)
        .await
    }

    pub async fn get_pending_transactions<D: DomDriver>(
        &self,
        session: &mut Session<D>,
    ) -> Result<Vec<Transaction>, ScrapeError> {
        self.get_transactions(session, TransactionFilter::PendingOnly).await
    }

    pub async fn get_recent_transactions<D: DomDriver>(
        &self,
        session: &mut Session<D>,
    ) -> Result<Vec<Transaction>, ScrapeError> {
        self.get_transactions(session, TransactionFilter::RecentAll).await
    }

    /// Read the transactions table, in table order.
    ///
    /// Every row is visited. Under [`TransactionFilter::PendingOnly`] rows
    /// whose type cell is not the pending marker are left out of the result;
    /// with no type column configured the pending tab alone does the
    /// filtering.
    pub async fn get_transactions<D: DomDriver>(
        &self,
        session: &mut Session<D>,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, ScrapeError> {
        session.ensure_authenticated(&format!("read {} transactions", filter))?;
        let span = session.span();

        async {
            let cfg = &self.config.transactions;
            let step_timeout = self.config.timeouts.step();
            let sequence = Some(Instant::now() + self.config.timeouts.extraction());
            let (driver, ctl) = session.parts();

            step(
                ctl,
                sequence,
                "open transactions",
                driver.navigate(&self.config.site.transactions_url),
            )
            .await?;

            if filter.is_pending_only() {
                require_visible(driver, ctl, sequence, &cfg.pending_tab, step_timeout).await?;
                step(ctl, sequence, "select pending tab", driver.click(&cfg.pending_tab)).await?;
            }

            require_visible(driver, ctl, sequence, &cfg.table, step_timeout).await?;

            if let Some(hidden) = cfg.hidden_rows() {
                let script = scripts::remove_elements(hidden);
                let removal = driver.evaluate_script(&script);
                let outcome = step(ctl, sequence, "remove hidden rows", removal).await?;
                if outcome != serde_json::Value::Bool(true) {
                    return Err(ScrapeError::extraction(
                        ViewKind::Transactions,
                        format!("hidden row removal reported {}", outcome),
                    ));
                }
            }

            let rows = step(ctl, sequence, "list rows", driver.extract_nodes(&cfg.rows)).await?;
            let scheme = IdentityScheme::resolve(&rows, cfg.native_id_attribute.as_deref())?;
            debug!(rows = rows.len(), ?scheme, "Listed transaction rows");

            let columns = &cfg.columns;
            let mut transactions = Vec::with_capacity(rows.len());

            for (index, node) in rows.iter().enumerate() {
                let row = index + 1;

                let kind_column = columns.kind.filter(|_| filter.is_pending_only());
                if let Some(column) = kind_column {
                    let selector = cfg.cell_selector(row, column);
                    let kind = read_cell(driver, ctl, sequence, &selector).await?;
                    let pending = kind
                        .as_deref()
                        .is_some_and(|k| k.trim().eq_ignore_ascii_case(cfg.pending_marker.trim()));
                    if !pending {
                        debug!(row, kind = kind.as_deref().unwrap_or(""), "Row is not pending");
                        continue;
                    }
                }

                let cell = |column: u32| cfg.cell_selector(row, column);
                let date = read_cell(driver, ctl, sequence, &cell(columns.date)).await?;
                let description =
                    read_cell(driver, ctl, sequence, &cell(columns.description)).await?;
                let amount = read_cell(driver, ctl, sequence, &cell(columns.amount)).await?;

                let (Some(date), Some(description), Some(amount)) = (date, description, amount)
                else {
                    reject_row(
                        cfg.row_errors,
                        row,
                        ScrapeError::extraction(
                            ViewKind::Transactions,
                            format!("row {} is missing a date, description or amount cell", row),
                        ),
                    )?;
                    continue;
                };

                match parse_transaction(&date, &description, &amount, scheme.native_id(node)) {
                    Ok(transaction) => transactions.push(transaction),
                    Err(e) => reject_row(cfg.row_errors, row, e.into())?,
                }
            }

            info!(count = transactions.len(), %filter, "Transactions retrieved");
            Ok::<_, ScrapeError>(transactions)
        }
        .instrument(span)
        .await
    }
}

/// Run one driver call of an extraction sequence. Driver errors pass
/// through untouched.
async fn step<T, F>(
    ctl: &mut SessionControl,
    sequence: Option<Instant>,
    operation: &str,
    fut: F,
) -> Result<T, ScrapeError>
where
    F: Future<Output = Result<T, DriverError>>,
{
    debug!(operation, "Extraction step");

    match ctl.guard(sequence, fut).await {
        Ok(result) => result.map_err(ScrapeError::from),
        Err(interrupt) => Err(interrupt.into_error(operation)),
    }
}

/// Wait for an element the transactions view cannot do without.
async fn require_visible<D: DomDriver>(
    driver: &D,
    ctl: &mut SessionControl,
    sequence: Option<Instant>,
    selector: &str,
    timeout: Duration,
) -> Result<(), ScrapeError> {
    debug!(selector, "Waiting for element");

    match ctl.guard(sequence, driver.wait_visible(selector, timeout)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e @ (DriverError::Timeout(_) | DriverError::ElementNotFound(_)))) => {
            Err(ScrapeError::extraction(
                ViewKind::Transactions,
                format!("'{}' never became visible: {}", selector, e),
            ))
        }
        Ok(Err(e)) => Err(e.into()),
        Err(Interrupt::SequenceDeadline) => Err(ScrapeError::extraction(
            ViewKind::Transactions,
            format!("'{}' was not visible before the extraction deadline", selector),
        )),
        Err(interrupt) => Err(interrupt.into_error("read transactions")),
    }
}

/// Text of the first node matching a cell selector.
async fn read_cell<D: DomDriver>(
    driver: &D,
    ctl: &mut SessionControl,
    sequence: Option<Instant>,
    selector: &str,
) -> Result<Option<String>, ScrapeError> {
    let texts = step(ctl, sequence, "read cell", driver.extract_text(selector)).await?;
    Ok(texts.into_iter().next())
}

fn reject_row(policy: RowErrorPolicy, row: usize, error: ScrapeError) -> Result<(), ScrapeError> {
    match policy {
        RowErrorPolicy::FailFast => Err(error),
        RowErrorPolicy::Skip => {
            warn!(row, error = %error, "Skipping transaction row");
            Ok(())
        }
    }
}
