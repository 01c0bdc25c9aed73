//! Domain types.

mod credentials;
mod records;
mod session;

pub use credentials::Credentials;
pub use records::{IdentitySource, Overview, Transaction, TransactionFilter};
pub use session::{LoginStep, SessionState, ViewKind};
