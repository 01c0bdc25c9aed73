//! amex-scraper
//!
//! Logs into the American Express UK web app through a Chrome instance and
//! prints balances or transactions as a table or JSON.

mod cli;
mod cmd_config;
mod cmd_scrape;

use std::path::Path;

use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use amex_config::{ConfigLoader, ConfigValidator, RowErrorPolicy, ScraperConfig};
use amex_protocols::TransactionFilter;

use cli::{Cli, Commands};
use cmd_scrape::Job;

fn init_tracing(log_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    // Optional file layer (daily rotation, 30 days kept)
    let file_layer = match log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("amex-scraper")
                .filename_suffix("log")
                .max_log_files(30)
                .build(log_dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keep the writer flushing for the program duration
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer on stderr; stdout carries the scraped data
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(true),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Load the config file (defaults if it does not exist) and reject it if
/// invalid.
fn load_config(path: &Path) -> anyhow::Result<ScraperConfig> {
    let config = ConfigLoader::load_or_default(path)?;
    for warning in ConfigValidator::validate(&config).into_result()? {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_dir.as_deref()).map_err(|e| anyhow::anyhow!("{}", e))?;

    match cli.command {
        Commands::Overview { login } => {
            let config = load_config(&cli.config)?;
            cmd_scrape::run(config, login, Job::Overview).await
        }
        Commands::Transactions {
            login,
            pending,
            skip_bad_rows,
        } => {
            let mut config = load_config(&cli.config)?;
            if skip_bad_rows {
                config.transactions.row_errors = RowErrorPolicy::Skip;
            }
            let filter = if pending {
                TransactionFilter::PendingOnly
            } else {
                TransactionFilter::RecentAll
            };
            cmd_scrape::run(config, login, Job::Transactions(filter)).await
        }
        Commands::CheckConfig => cmd_config::check(&cli.config),
    }
}
