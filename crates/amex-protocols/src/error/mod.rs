//! Error types for the scraper.

mod driver;
mod parse;
mod scrape;

pub use driver::*;
pub use parse::*;
pub use scrape::*;
