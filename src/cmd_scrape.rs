//! The `overview` and `transactions` commands.

use std::sync::Arc;

use anyhow::Context;
use amex_config::ScraperConfig;
use amex_core::{AmexClient, SessionController};
use amex_driver_cdp::{BrowserLauncher, CdpDriver};
use amex_protocols::{Overview, Transaction, TransactionFilter};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{LoginArgs, OutputFormat};

/// What to read once logged in.
pub(crate) enum Job {
    Overview,
    Transactions(TransactionFilter),
}

/// Log in, run `job`, print the result, and tear the browser down whatever
/// the outcome.
pub(crate) async fn run(config: ScraperConfig, login: LoginArgs, job: Job) -> anyhow::Result<()> {
    let config = Arc::new(config);

    // Credentials are checked before any browser is started.
    let controller = SessionController::new(login.user_id, login.password, Arc::clone(&config))?;

    let mut launcher = None;
    let driver = match &login.endpoint {
        Some(endpoint) => {
            info!("Attaching to Chrome at {}", endpoint);
            CdpDriver::connect(endpoint, config.browser.request_timeout())
                .await
                .with_context(|| format!("could not attach to Chrome at {}", endpoint))?
        }
        None => {
            let launcher = launcher.insert(BrowserLauncher::new(config.browser.clone()));
            launcher.launch().await.context("could not start Chrome")?
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let result = scrape(&controller, driver, cancel, job, login.format).await;

    if let Some(launcher) = launcher.as_mut() {
        launcher.shutdown().await;
    }
    result
}

async fn scrape(
    controller: &SessionController,
    driver: CdpDriver,
    cancel: CancellationToken,
    job: Job,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut client = AmexClient::connect_with(controller, driver, cancel).await?;

    let outcome = match job {
        Job::Overview => client.overview().await.map(|o| print_overview(&o, format)),
        Job::Transactions(TransactionFilter::PendingOnly) => client
            .pending_transactions()
            .await
            .map(|t| print_transactions(&t, format)),
        Job::Transactions(TransactionFilter::RecentAll) => client
            .recent_transactions()
            .await
            .map(|t| print_transactions(&t, format)),
    };

    client.close().await;
    outcome??;
    Ok(())
}

fn print_overview(overview: &Overview, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(overview)?),
        OutputFormat::Table => {
            let figures = [
                ("Statement balance", overview.statement_balance),
                ("Available credit", overview.available_credit),
                ("Total balance", overview.total_balance),
            ];
            for (label, pence) in figures {
                println!("{:<20} {:>16}", label, format_pence(pence));
            }
        }
    }
    Ok(())
}

fn print_transactions(transactions: &[Transaction], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(transactions)?),
        OutputFormat::Table => {
            if transactions.is_empty() {
                println!("No transactions found.");
                return Ok(());
            }
            println!("{:<10} {:<40} {:>12}  {}", "DATE", "DESCRIPTION", "AMOUNT", "ID");
            println!("{}", "-".repeat(80));
            for tx in transactions {
                println!(
                    "{:<10} {:<40} {:>12}  {}",
                    tx.date,
                    truncate(&tx.description, 40),
                    format_pence(tx.amount),
                    truncate(&tx.id, 12)
                );
            }
        }
    }
    Ok(())
}

/// `-1234` -> `-£12.34`
fn format_pence(pence: i64) -> String {
    let sign = if pence < 0 { "-" } else { "" };
    let abs = pence.unsigned_abs();
    format!("{}£{}.{:02}", sign, abs / 100, abs % 100)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
