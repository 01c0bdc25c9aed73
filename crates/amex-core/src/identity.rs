//! Transaction identity.
//!
//! The statement page has no stable row id, so a transaction is identified
//! by a SHA-256 fingerprint of its raw scraped date, description and amount.
//! This is for de-duplicating repeated scrapes only. Two genuine
//! transactions with the same date, description and amount share an id.

use amex_protocols::{DomNode, ScrapeError, ViewKind};
use sha2::{Digest, Sha256};

/// Fingerprint of the raw (pre-normalization) fields, lowercase hex.
pub fn derive_id(date: &str, description: &str, amount: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Id scheme for one retrieval, fixed before any row is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityScheme {
    Derived,
    /// Read the id from this row attribute.
    Native { attribute: String },
}

impl IdentityScheme {
    /// Pick the scheme the current table supports.
    ///
    /// Native ids are used only when every row carries the attribute; a
    /// table where some rows do and some don't is rejected rather than
    /// producing a mix of id kinds.
    pub fn resolve(rows: &[DomNode], attribute: Option<&str>) -> Result<Self, ScrapeError> {
        let Some(attribute) = attribute else {
            return Ok(Self::Derived);
        };

        let exposed = rows
            .iter()
            .filter(|row| row.attribute(attribute).is_some_and(|v| !v.trim().is_empty()))
            .count();

        match exposed {
            0 => Ok(Self::Derived),
            n if n == rows.len() => Ok(Self::Native {
                attribute: attribute.to_string(),
            }),
            n => Err(ScrapeError::extraction(
                ViewKind::Transactions,
                format!(
                    "{} of {} rows expose '{}'; refusing to mix native and derived ids",
                    n,
                    rows.len(),
                    attribute
                ),
            )),
        }
    }

    /// Native id of `row` under this scheme.
    pub fn native_id<'a>(&self, row: &'a DomNode) -> Option<&'a str> {
        match self {
            Self::Derived => None,
            Self::Native { attribute } => row.attribute(attribute).map(str::trim),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amex_protocols::ErrorKind;

    #[test]
    fn test_derive_id_is_deterministic() {
        let a = derive_id("01 JAN 20", "COFFEE SHOP", "£3.20");
        let b = derive_id("01 JAN 20", "COFFEE SHOP", "£3.20");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_derive_id_changes_with_each_field() {
        let base = derive_id("01 JAN 20", "COFFEE SHOP", "£3.20");
        assert_ne!(base, derive_id("02 JAN 20", "COFFEE SHOP", "£3.20"));
        assert_ne!(base, derive_id("01 JAN 20", "TEA SHOP", "£3.20"));
        assert_ne!(base, derive_id("01 JAN 20", "COFFEE SHOP", "£3.21"));
    }

    #[test]
    fn test_derive_id_uses_raw_bytes() {
        // Whitespace is significant: the raw scrape is hashed, not the trimmed value.
        assert_ne!(
            derive_id("01 JAN 20", " COFFEE SHOP ", "£3.20"),
            derive_id("01 JAN 20", "COFFEE SHOP", "£3.20")
        );
    }

    #[test]
    fn test_derive_id_known_value() {
        // sha256("")
        assert_eq!(
            derive_id("", "", ""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_resolve_without_attribute() {
        let rows = vec![DomNode::new(1)];
        assert_eq!(IdentityScheme::resolve(&rows, None).unwrap(), IdentityScheme::Derived);
    }

    #[test]
    fn test_resolve_all_native() {
        let rows = vec![
            DomNode::new(1).with_attribute("data-id", "A"),
            DomNode::new(2).with_attribute("data-id", "B"),
        ];
        let scheme = IdentityScheme::resolve(&rows, Some("data-id")).unwrap();
        assert_eq!(
            scheme,
            IdentityScheme::Native {
                attribute: "data-id".to_string()
            }
        );
        assert_eq!(scheme.native_id(&rows[1]), Some("B"));
    }

    #[test]
    fn test_resolve_none_exposed_falls_back() {
        let rows = vec![DomNode::new(1), DomNode::new(2).with_attribute("data-id", " ")];
        let scheme = IdentityScheme::resolve(&rows, Some("data-id")).unwrap();
        assert_eq!(scheme, IdentityScheme::Derived);
        assert_eq!(scheme.native_id(&rows[0]), None);
    }

    #[test]
    fn test_resolve_mixed_rejected() {
        let rows = vec![DomNode::new(1).with_attribute("data-id", "A"), DomNode::new(2)];
        let err = IdentityScheme::resolve(&rows, Some("data-id")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert!(err.to_string().contains("1 of 2"));
    }

    #[test]
    fn test_resolve_empty_table() {
        let scheme = IdentityScheme::resolve(&[], Some("data-id")).unwrap();
        assert_eq!(scheme, IdentityScheme::Derived);
    }
}
