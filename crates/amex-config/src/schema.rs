//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Schema version understood by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub login: LoginSelectors,

    #[serde(default)]
    pub overview: OverviewSelectors,

    #[serde(default)]
    pub transactions: TransactionsConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub browser: BrowserConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            site: SiteConfig::default(),
            login: LoginSelectors::default(),
            overview: OverviewSelectors::default(),
            transactions: TransactionsConfig::default(),
            timeouts: TimeoutConfig::default(),
            browser: BrowserConfig::default(),
        }
    }
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

fn default_true() -> bool {
    true
}

/// Endpoint URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_login_url")]
    pub login_url: String,

    #[serde(default = "default_transactions_url")]
    pub transactions_url: String,

    /// Page holding the balance summary. When unset, balances are read from
    /// whatever page the session is on, which after login is the dashboard.
    #[serde(default)]
    pub overview_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            transactions_url: default_transactions_url(),
            overview_url: None,
        }
    }
}

fn default_login_url() -> String {
    "https://global.americanexpress.com/login/en-GB?noRedirect=true&DestPage=%2Fdashboard".to_string()
}

fn default_transactions_url() -> String {
    "https://global.americanexpress.com/myca/intl/istatement/emea/v1/statement.do?Face=en_GB"
        .to_string()
}

/// Login form selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSelectors {
    #[serde(default = "default_cookie_notice")]
    pub cookie_notice: String,

    #[serde(default = "default_user_id_input")]
    pub user_id_input: String,

    #[serde(default = "default_password_input")]
    pub password_input: String,

    #[serde(default = "default_submit")]
    pub submit: String,

    /// Element that only renders once the account dashboard has loaded.
    #[serde(default = "default_landing_marker")]
    pub landing_marker: String,

    #[serde(default = "default_true")]
    pub dismiss_cookie_notice: bool,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            cookie_notice: default_cookie_notice(),
            user_id_input: default_user_id_input(),
            password_input: default_password_input(),
            submit: default_submit(),
            landing_marker: default_landing_marker(),
            dismiss_cookie_notice: true,
        }
    }
}

fn default_cookie_notice() -> String {
    "#sprite-AcceptButton_EN".to_string()
}

fn default_user_id_input() -> String {
    "#eliloUserID".to_string()
}

fn default_password_input() -> String {
    "#eliloPassword".to_string()
}

fn default_submit() -> String {
    "#loginSubmit".to_string()
}

fn default_landing_marker() -> String {
    ".axp-account-switcher".to_string()
}

/// Balance summary selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewSelectors {
    /// Matches exactly three value nodes: statement balance, available
    /// credit, total balance, in that document order.
    #[serde(default = "default_summary_values")]
    pub summary_values: String,
}

impl Default for OverviewSelectors {
    fn default() -> Self {
        Self {
            summary_values: default_summary_values(),
        }
    }
}

fn default_summary_values() -> String {
    ".balance-container .data-value".to_string()
}

/// What to do with a row that fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// Abort the whole retrieval on the first bad row.
    #[default]
    FailFast,
    /// Log the bad row and leave it out of the result.
    Skip,
}

/// Transactions table configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsConfig {
    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_rows")]
    pub rows: String,

    /// Collapsed detail rows that break `nth-of-type` indexing; removed
    /// before rows are counted. An empty string disables the removal step.
    #[serde(default = "default_hidden_rows")]
    pub hidden_rows: Option<String>,

    #[serde(default = "default_pending_tab")]
    pub pending_tab: String,

    #[serde(default = "default_pending_marker")]
    pub pending_marker: String,

    /// Row attribute carrying a site-issued transaction id, when the
    /// markup has one.
    #[serde(default)]
    pub native_id_attribute: Option<String>,

    #[serde(default)]
    pub row_errors: RowErrorPolicy,

    #[serde(default)]
    pub columns: ColumnConfig,
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            rows: default_rows(),
            hidden_rows: default_hidden_rows(),
            pending_tab: default_pending_tab(),
            pending_marker: default_pending_marker(),
            native_id_attribute: None,
            row_errors: RowErrorPolicy::default(),
            columns: ColumnConfig::default(),
        }
    }
}

impl TransactionsConfig {
    /// Hidden-row selector, if the removal step is enabled.
    pub fn hidden_rows(&self) -> Option<&str> {
        self.hidden_rows.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Selector for row `row` (1-based).
    pub fn row_selector(&self, row: usize) -> String {
        format!("{}:nth-of-type({})", self.rows, row)
    }

    /// Selector for the cell at `row`, `column` (both 1-based).
    pub fn cell_selector(&self, row: usize, column: u32) -> String {
        format!("{} > td:nth-of-type({})", self.row_selector(row), column)
    }
}

fn default_table() -> String {
    "#transaction-table".to_string()
}

fn default_rows() -> String {
    "#transaction-table tbody tr".to_string()
}

fn default_hidden_rows() -> Option<String> {
    Some("#transaction-table tbody tr.ng-hide".to_string())
}

fn default_pending_tab() -> String {
    ".transaction-tabs > div:nth-of-type(2)".to_string()
}

fn default_pending_marker() -> String {
    "Pending".to_string()
}

/// 1-based cell positions within a transactions row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "default_date_column")]
    pub date: u32,

    #[serde(default = "default_description_column")]
    pub description: u32,

    #[serde(default = "default_amount_column")]
    pub amount: u32,

    /// Status column compared against `pending_marker`.
    #[serde(default)]
    pub kind: Option<u32>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            date: default_date_column(),
            description: default_description_column(),
            amount: default_amount_column(),
            kind: None,
        }
    }
}

impl ColumnConfig {
    /// Every configured column with its field name.
    pub fn named(&self) -> Vec<(&'static str, u32)> {
        let mut cols = vec![
            ("date", self.date),
            ("description", self.description),
            ("amount", self.amount),
        ];
        if let Some(kind) = self.kind {
            cols.push(("kind", kind));
        }
        cols
    }
}

fn default_date_column() -> u32 {
    1
}

fn default_description_column() -> u32 {
    2
}

fn default_amount_column() -> u32 {
    3
}

/// Timeouts, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Deadline for the whole session. `0` (or `None`) leaves it unbounded.
    #[serde(default = "default_session_secs")]
    pub session_secs: Option<u64>,

    #[serde(default = "default_login_secs")]
    pub login_secs: u64,

    #[serde(default = "default_extraction_secs")]
    pub extraction_secs: u64,

    /// Per `wait_visible` call.
    #[serde(default = "default_step_secs")]
    pub step_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            session_secs: default_session_secs(),
            login_secs: default_login_secs(),
            extraction_secs: default_extraction_secs(),
            step_secs: default_step_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn session(&self) -> Option<Duration> {
        self.session_secs.filter(|&s| s > 0).map(Duration::from_secs)
    }

    pub fn login(&self) -> Duration {
        Duration::from_secs(self.login_secs)
    }

    pub fn extraction(&self) -> Duration {
        Duration::from_secs(self.extraction_secs)
    }

    pub fn step(&self) -> Duration {
        Duration::from_secs(self.step_secs)
    }
}

fn default_session_secs() -> Option<u64> {
    Some(300)
}

fn default_login_secs() -> u64 {
    60
}

fn default_extraction_secs() -> u64 {
    30
}

fn default_step_secs() -> u64 {
    10
}

/// Chrome connection settings for the CDP driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default)]
    pub profile_dir: Option<PathBuf>,

    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: true,
            profile_dir: None,
            chrome_path: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BrowserConfig {
    /// CDP HTTP endpoint on localhost.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }

    /// Profile directory, `~` expanded, defaulting under the home directory.
    pub fn profile_dir(&self) -> PathBuf {
        match &self.profile_dir {
            Some(dir) => PathBuf::from(crate::ConfigLoader::expand_path(&dir.to_string_lossy())),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".amex-scraper")
                .join("browser-profile"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
