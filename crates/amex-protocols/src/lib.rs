//! # Amex Protocols
//!
//! Shared vocabulary for the scraper crates.
//!
//! ## Core Types
//!
//! - [`Overview`] / [`Transaction`] - Normalized records handed to callers
//! - [`IdentitySource`] - Where a transaction's `id` came from
//! - [`Credentials`] - Login secrets, validated once and never echoed
//!
//! ## Driver Seam
//!
//! [`DomDriver`] is the only thing the scraping core knows about a browser.
//! Anything that can navigate, click, wait, type and read the DOM can back a
//! session, including the scripted fakes used in tests.

pub mod driver;
pub mod error;
pub mod types;

pub use driver::{DomDriver, DomNode};
pub use error::*;
pub use types::*;
