//! Domain records: books, users, and loans
//!
//! Records are plain data. Identifiers are newtypes over the SQLite rowid so
//! a book id can never be passed where a user id is expected.

/// Declares a rowid-backed identifier with `Display` and `FromStr`.
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw rowid value
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::LibraryError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self).map_err(|_| {
                    crate::error::LibraryError::InvalidInput(format!(
                        concat!("not a valid ", $label, " id: '{}'"),
                        s
                    ))
                })
            }
        }
    };
}

pub(crate) use record_id;

mod book;
mod loan;
mod user;

pub use book::{Book, BookDraft, BookId, BookOption};
pub use loan::{
    days_late, due_date_for, late_fee, Loan, LoanId, LoanRow, LoanState, ReturnReceipt,
    FEE_PER_DAY, LOAN_PERIOD_DAYS,
};
pub use user::{User, UserDraft, UserId, UserOption};

/// Trim a required text field, rejecting blank values.
pub(crate) fn required_text(field: &str, value: String) -> crate::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::LibraryError::InvalidInput(format!(
            "{field} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank collapses to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LibraryError;

    #[test]
    fn test_id_parse() {
        let id: BookId = " 42 ".parse().unwrap();
        assert_eq!(id, BookId(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_id_parse_rejects_selection_label() {
        let err = "3: Dune".parse::<BookId>().unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput(_)));
        assert!(err.to_string().contains("book id"));
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text(Some("   ".into())), None);
        assert_eq!(optional_text(Some(" 111 ".into())), Some("111".into()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("title", " Dune ".into()).unwrap(), "Dune");
        assert!(required_text("title", "  ".into()).is_err());
    }
}
