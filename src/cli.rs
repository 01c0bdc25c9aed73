//! CLI definitions for amex-scraper.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// amex-scraper CLI.
#[derive(Parser)]
#[command(name = "amex-scraper")]
#[command(about = "Scrape balances and transactions from the American Express UK web app")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Also write daily-rotated log files to this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print statement balance, available credit and total balance
    Overview {
        #[command(flatten)]
        login: LoginArgs,
    },

    /// Print recent (or only pending) transactions
    Transactions {
        #[command(flatten)]
        login: LoginArgs,

        /// Only transactions that have not settled yet
        #[arg(long)]
        pending: bool,

        /// Leave out rows that fail to parse instead of failing the command
        #[arg(long)]
        skip_bad_rows: bool,
    },

    /// Validate the configuration file and exit
    CheckConfig,
}

/// Credentials and browser options shared by the scraping commands.
#[derive(Args)]
pub(crate) struct LoginArgs {
    /// Account user ID
    #[arg(long, env = "AMEX_USER_ID", hide_env_values = true, default_value = "")]
    pub user_id: String,

    /// Account password
    #[arg(long, env = "AMEX_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,

    /// Attach to a running Chrome DevTools endpoint instead of launching Chrome
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}
