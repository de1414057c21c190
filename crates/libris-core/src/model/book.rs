//! Book records and the copy counters

use serde::{Deserialize, Serialize};

use super::{optional_text, record_id, required_text};
use crate::error::{LibraryError, Result};

record_id!(
    /// Identifier of a book (`books.book_id`)
    BookId,
    "book"
);

/// A catalogued title with its copy counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Unique when present
    pub isbn: Option<String>,
    pub total_copies: i64,
    /// Copies on the shelf; changed only by issuing and returning loans
    pub available_copies: i64,
}

impl Book {
    /// Whether at least one copy can be issued
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Copies currently out on loan, as implied by the counters
    pub fn copies_on_loan(&self) -> i64 {
        (self.total_copies - self.available_copies).max(0)
    }
}

/// Editable fields of a book, used for both add and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub total_copies: i64,
}

impl BookDraft {
    /// Create a draft without an isbn
    pub fn new(title: impl Into<String>, author: impl Into<String>, total_copies: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: None,
            total_copies,
        }
    }

    /// Set the isbn
    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    /// Normalise and check the draft before it reaches the store.
    pub(crate) fn validate(self) -> Result<Self> {
        if self.total_copies < 1 {
            return Err(LibraryError::InvalidInput(format!(
                "total copies must be at least 1, got {}",
                self.total_copies
            )));
        }
        Ok(Self {
            title: required_text("title", self.title)?,
            author: required_text("author", self.author)?,
            isbn: optional_text(self.isbn),
            total_copies: self.total_copies,
        })
    }
}

/// Selection-list entry for books that can be issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookOption {
    pub id: BookId,
    pub title: String,
}

impl std::fmt::Display for BookOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_copies() {
        let err = BookDraft::new("Dune", "Herbert", 0).validate().unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_negative_copies() {
        assert!(BookDraft::new("Dune", "Herbert", -2).validate().is_err());
    }

    #[test]
    fn test_validate_blank_isbn_becomes_none() {
        let draft = BookDraft::new(" Dune ", "Herbert", 2)
            .with_isbn("  ")
            .validate()
            .unwrap();
        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.isbn, None);
    }

    #[test]
    fn test_validate_rejects_blank_author() {
        assert!(BookDraft::new("Dune", "", 1).validate().is_err());
    }

    #[test]
    fn test_copies_on_loan() {
        let book = Book {
            id: BookId(1),
            title: "Dune".into(),
            author: "Herbert".into(),
            isbn: None,
            total_copies: 3,
            available_copies: 1,
        };
        assert!(book.is_available());
        assert_eq!(book.copies_on_loan(), 2);
    }
}
