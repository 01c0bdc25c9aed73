//! # Amex Config
//!
//! Selectors, URLs and timeouts for the scraper.
//!
//! The target site's markup changes without notice, so nothing here is
//! business logic: every selector is data, versioned by `schema_version`,
//! and the defaults describe the markup as last verified.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
