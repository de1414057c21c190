//! Error types for libris-core

use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Main error type for library operations.
///
/// Every failed operation leaves books, users, and loans unchanged; the
/// variant tells the caller why.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// A uniqueness or referential rule was violated (duplicate isbn/email,
    /// deleting a record that loans still reference)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The referenced record does not exist, or a loan was already returned
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected before touching the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The book has no copy available to issue
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Underlying persistence failure
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}

/// Persistence-specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// A stored date column is not `YYYY-MM-DD` text
    #[error("Date format error: {0}")]
    DateFormat(String),
}

impl LibraryError {
    /// Rewrite the message of a constraint violation, leaving other errors as they are.
    pub(crate) fn on_constraint(self, message: impl FnOnce() -> String) -> Self {
        match self {
            LibraryError::ConstraintViolation(_) => LibraryError::ConstraintViolation(message()),
            other => other,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::FromSqlConversionFailure(_, _, ref source) = err {
            if source.downcast_ref::<chrono::ParseError>().is_some() {
                return StoreError::DateFormat(err.to_string());
            }
        }
        StoreError::Database(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<rusqlite::Error> for LibraryError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                return LibraryError::ConstraintViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                );
            }
        }
        LibraryError::Store(StoreError::from(err))
    }
}
