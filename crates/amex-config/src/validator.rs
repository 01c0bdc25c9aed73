//! Configuration validation.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::schema::{CURRENT_SCHEMA_VERSION, ScraperConfig};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse into the first error, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &ScraperConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_version(config, &mut result);
        Self::validate_site(config, &mut result);
        Self::validate_selectors(config, &mut result);
        Self::validate_columns(config, &mut result);
        Self::validate_timeouts(config, &mut result);

        result
    }

    fn validate_version(config: &ScraperConfig, result: &mut ValidationResult) {
        if config.schema_version != CURRENT_SCHEMA_VERSION {
            result.add_error(ValidationError::new(
                "schema_version",
                format!(
                    "Unsupported schema version {} (expected {})",
                    config.schema_version, CURRENT_SCHEMA_VERSION
                ),
            ));
        }
    }

    fn validate_site(config: &ScraperConfig, result: &mut ValidationResult) {
        let site = &config.site;
        let mut urls = vec![
            ("site.login_url", site.login_url.as_str()),
            ("site.transactions_url", site.transactions_url.as_str()),
        ];
        if let Some(url) = &site.overview_url {
            urls.push(("site.overview_url", url.as_str()));
        }

        for (path, url) in urls {
            if url.trim().is_empty() {
                result.add_error(ValidationError::new(path, "URL cannot be empty"));
            } else if !url.starts_with("https://") && !url.starts_with("http://") {
                result.add_error(ValidationError::new(path, "URL must be http(s)"));
            }
        }
    }

    fn validate_selectors(config: &ScraperConfig, result: &mut ValidationResult) {
        let login = &config.login;
        let tx = &config.transactions;

        let mut required = vec![
            ("login.user_id_input", &login.user_id_input),
            ("login.password_input", &login.password_input),
            ("login.submit", &login.submit),
            ("login.landing_marker", &login.landing_marker),
            ("overview.summary_values", &config.overview.summary_values),
            ("transactions.table", &tx.table),
            ("transactions.rows", &tx.rows),
            ("transactions.pending_tab", &tx.pending_tab),
            ("transactions.pending_marker", &tx.pending_marker),
        ];
        if login.dismiss_cookie_notice {
            required.push(("login.cookie_notice", &login.cookie_notice));
        }

        for (path, selector) in required {
            if selector.trim().is_empty() {
                result.add_error(ValidationError::new(path, "Selector cannot be empty"));
            }
        }

        // Selectors are spliced into in-page scripts as JSON strings, but a
        // stray quote is almost always a copy/paste mistake.
        if tx.rows.contains('\'') || tx.table.contains('\'') {
            result.add_warning(ValidationWarning::new(
                "transactions.rows",
                "Selector contains a single quote",
            ));
        }

        if let Some(attr) = &tx.native_id_attribute {
            if attr.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "transactions.native_id_attribute",
                    "Attribute name cannot be empty; omit the key to use derived ids",
                ));
            }
        }
    }

    fn validate_columns(config: &ScraperConfig, result: &mut ValidationResult) {
        let mut seen: HashMap<u32, &'static str> = HashMap::new();

        for (name, index) in config.transactions.columns.named() {
            let path = format!("transactions.columns.{}", name);
            if index == 0 {
                result.add_error(ValidationError::new(path, "Column indices start at 1"));
                continue;
            }
            if let Some(other) = seen.insert(index, name) {
                result.add_error(ValidationError::new(
                    path,
                    format!("Column {} is already used by '{}'", index, other),
                ));
            }
        }
    }

    fn validate_timeouts(config: &ScraperConfig, result: &mut ValidationResult) {
        let t = &config.timeouts;

        for (path, secs) in [
            ("timeouts.login_secs", t.login_secs),
            ("timeouts.extraction_secs", t.extraction_secs),
            ("timeouts.step_secs", t.step_secs),
            ("browser.request_timeout_secs", config.browser.request_timeout_secs),
        ] {
            if secs == 0 {
                result.add_error(ValidationError::new(path, "Timeout must be greater than 0"));
            }
        }

        if t.session().is_none() {
            result.add_warning(ValidationWarning::new(
                "timeouts.session_secs",
                "No session deadline; a stalled browser will hang until cancelled",
            ));
        }

        if t.step_secs > t.extraction_secs || t.step_secs > t.login_secs {
            result.add_warning(ValidationWarning::new(
                "timeouts.step_secs",
                "Step timeout exceeds a sequence timeout and will never fire",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
