//! # Amex Core
//!
//! Scraping core for the American Express UK web app.
//!
//! ## Components
//!
//! - [`SessionController`] - Runs the login sequence and hands out [`Session`]s
//! - [`ViewExtractor`] - Reads the overview and transactions views from a session
//! - [`AmexClient`] - Controller and extractor bundled around one session
//!
//! ## Normalization
//!
//! Raw page text becomes typed records through [`normalize_amount`],
//! [`normalize_date`], [`derive_id`] and the record parsers in [`parser`].
//!
//! Everything here talks to the browser through
//! [`DomDriver`](amex_protocols::DomDriver) only.

pub mod amount;
pub mod client;
pub mod date;
pub mod identity;
pub mod parser;
pub mod scripts;
pub mod session;
pub mod views;

pub use amount::{normalize_amount, normalize_amounts};
pub use client::AmexClient;
pub use date::normalize_date;
pub use identity::{derive_id, IdentityScheme};
pub use parser::{parse_overview, parse_transaction, OVERVIEW_FIELDS};
pub use session::{Session, SessionController};
pub use views::ViewExtractor;
