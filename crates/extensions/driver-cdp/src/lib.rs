//! Chrome DevTools Protocol driver for amex-scraper.
//!
//! Implements [`DomDriver`](amex_protocols::DomDriver) by driving one
//! Chrome tab over CDP. Pure Rust, no Node.js or chromedriver.
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │   CdpDriver     │ ◄──────────────► │  Chrome/Chromium │
//! │  (this crate)   │       CDP        │   (one tab)      │
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! Either let [`BrowserLauncher`] start Chrome with the configured profile,
//! or start it yourself and attach with [`CdpDriver::connect`]:
//!
//! ```bash
//! google-chrome --remote-debugging-port=9222
//! ```

pub mod cdp;
pub mod driver;
pub mod launcher;
pub mod scripts;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use driver::CdpDriver;
pub use launcher::BrowserLauncher;
