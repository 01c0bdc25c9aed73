//! CDP page session for driving a single page.

mod core;
mod dom;
mod input;
mod js;
mod navigation;

pub use self::core::PageSession;
