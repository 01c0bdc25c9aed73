//! Raw field tuples to domain records.

use amex_protocols::{IdentitySource, Overview, ParseError, Transaction};

use crate::amount::{normalize_amount, normalize_amounts};
use crate::date::normalize_date;
use crate::identity::derive_id;

/// Number of values in the balance summary.
pub const OVERVIEW_FIELDS: usize = 3;

/// Build an [`Overview`] from the summary values in document order.
///
/// The order is fixed by the page: statement balance, available credit,
/// total balance. Labels are not consulted.
pub fn parse_overview<S: AsRef<str>>(fields: &[S]) -> Result<Overview, ParseError> {
    if fields.len() != OVERVIEW_FIELDS {
        return Err(ParseError::FieldCount {
            expected: OVERVIEW_FIELDS,
            actual: fields.len(),
        });
    }

    let values = normalize_amounts(fields)?;
    let &[statement_balance, available_credit, total_balance] = values.as_slice() else {
        return Err(ParseError::FieldCount {
            expected: OVERVIEW_FIELDS,
            actual: values.len(),
        });
    };

    Ok(Overview {
        available_credit,
        statement_balance,
        total_balance,
    })
}

/// Build a [`Transaction`] from one scraped row.
///
/// With `native_id` the page's own identifier is used verbatim, otherwise
/// the id is derived from the raw date, description and amount.
pub fn parse_transaction(
    date: &str,
    description: &str,
    amount: &str,
    native_id: Option<&str>,
) -> Result<Transaction, ParseError> {
    let identity = match native_id {
        Some(id) => IdentitySource::Native(id.to_string()),
        None => IdentitySource::Derived(derive_id(date, description, amount)),
    };

    let amount = normalize_amount(amount)?;
    let date = normalize_date(date)?;

    Ok(Transaction {
        amount,
        date,
        description: description.trim().to_string(),
        id: identity.into_id(),
    })
}
