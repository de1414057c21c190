//! Inventory ledger: book records and their copy counters
//!
//! Title, author, isbn, and total copies are edited here. The available
//! counter moves only through [`Inventory::decrement_available`] and
//! [`Inventory::increment_available`], which the loan desk calls inside its
//! issue/return transactions.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{LibraryError, Result};
use crate::model::{Book, BookDraft, BookId, BookOption};

const BOOK_COLUMNS: &str = "book_id, title, author, isbn, total_copies, available_copies";

/// Book operations over a borrowed store connection
pub struct Inventory<'a> {
    conn: &'a Connection,
}

impl<'a> Inventory<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Catalogue a new book with every copy on the shelf
    pub fn add_book(&self, draft: BookDraft) -> Result<Book> {
        let draft = draft.validate()?;
        debug!(title = %draft.title, isbn = ?draft.isbn, "adding book");

        self.conn
            .execute(
                "INSERT INTO books (title, author, isbn, total_copies, available_copies)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![draft.title, draft.author, draft.isbn, draft.total_copies],
            )
            .map_err(|e| {
                let err = LibraryError::from(e).on_constraint(|| duplicate_isbn(&draft));
                warn!(error = %err, "book rejected");
                err
            })?;

        let book = Book {
            id: BookId(self.conn.last_insert_rowid()),
            title: draft.title,
            author: draft.author,
            isbn: draft.isbn,
            total_copies: draft.total_copies,
            available_copies: draft.total_copies,
        };
        info!(book = %book.id, title = %book.title, copies = book.total_copies, "book added");
        Ok(book)
    }

    /// Overwrite the editable fields of a book.
    ///
    /// `available_copies` is left as it is, even if it now exceeds the new total.
    pub fn update_book(&self, id: BookId, draft: BookDraft) -> Result<Book> {
        let draft = draft.validate()?;
        debug!(book = %id, "updating book");

        let updated = self
            .conn
            .execute(
                "UPDATE books SET title = ?1, author = ?2, isbn = ?3, total_copies = ?4
                 WHERE book_id = ?5",
                params![draft.title, draft.author, draft.isbn, draft.total_copies, id.0],
            )
            .map_err(|e| LibraryError::from(e).on_constraint(|| duplicate_isbn(&draft)))?;

        if updated == 0 {
            return Err(book_not_found(id));
        }

        let book = self.get_book(id)?;
        if book.available_copies > book.total_copies {
            warn!(
                book = %id,
                total = book.total_copies,
                available = book.available_copies,
                "available copies exceed total after update"
            );
        }
        info!(book = %id, "book updated");
        Ok(book)
    }

    /// Remove a book.
    ///
    /// Books with loan history are kept; the store rejects the delete with a
    /// constraint violation.
    pub fn delete_book(&self, id: BookId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM books WHERE book_id = ?1", [id.0])
            .map_err(|e| {
                LibraryError::from(e)
                    .on_constraint(|| format!("book {id} is referenced by loan records"))
            })?;

        if deleted == 0 {
            return Err(book_not_found(id));
        }
        info!(book = %id, "book deleted");
        Ok(())
    }

    /// Get a book by ID
    pub fn get_book(&self, id: BookId) -> Result<Book> {
        self.find_book(id)?.ok_or_else(|| book_not_found(id))
    }

    /// Get a book by ID, `None` if absent
    pub fn find_book(&self, id: BookId) -> Result<Option<Book>> {
        let book = self
            .conn
            .query_row(
                &format!("SELECT {BOOK_COLUMNS} FROM books WHERE book_id = ?1"),
                [id.0],
                Self::row_to_book,
            )
            .optional()?;
        Ok(book)
    }

    /// All books in catalogue order
    pub fn list_books(&self) -> Result<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY book_id"))?;

        let books = stmt
            .query_map([], Self::row_to_book)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(books)
    }

    /// Books with at least one copy on the shelf, for the issue selection list
    pub fn list_available_books(&self) -> Result<Vec<BookOption>> {
        let mut stmt = self.conn.prepare(
            "SELECT book_id, title FROM books WHERE available_copies > 0 ORDER BY book_id",
        )?;

        let options = stmt
            .query_map([], |row| {
                Ok(BookOption {
                    id: BookId(row.get(0)?),
                    title: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(options)
    }

    /// Take one copy off the shelf.
    ///
    /// The availability check and the decrement are a single statement, so
    /// the counter cannot go below zero.
    pub(crate) fn decrement_available(&self, id: BookId) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE books SET available_copies = available_copies - 1
             WHERE book_id = ?1 AND available_copies > 0",
            [id.0],
        )?;

        if updated == 0 {
            return Err(LibraryError::Unavailable(format!(
                "book {id} has no available copies"
            )));
        }
        Ok(())
    }

    /// Put one copy back on the shelf
    pub(crate) fn increment_available(&self, id: BookId) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE books SET available_copies = available_copies + 1 WHERE book_id = ?1",
            [id.0],
        )?;

        if updated == 0 {
            return Err(book_not_found(id));
        }
        Ok(())
    }

    fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
        Ok(Book {
            id: BookId(row.get(0)?),
            title: row.get(1)?,
            author: row.get(2)?,
            isbn: row.get(3)?,
            total_copies: row.get(4)?,
            available_copies: row.get(5)?,
        })
    }
}

fn book_not_found(id: BookId) -> LibraryError {
    LibraryError::NotFound(format!("book {id}"))
}

fn duplicate_isbn(draft: &BookDraft) -> String {
    match &draft.isbn {
        Some(isbn) => format!("isbn {isbn} is already catalogued"),
        None => "book conflicts with an existing record".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Store;

    fn dune() -> BookDraft {
        BookDraft::new("Dune", "Herbert", 2).with_isbn("111")
    }

    #[test]
    fn test_add_book_sets_available_to_total() {
        let store = Store::in_memory().unwrap();
        let inventory = Inventory::new(store.connection());

        let book = inventory.add_book(dune()).unwrap();
        assert_eq!(book.total_copies, 2);
        assert_eq!(book.available_copies, 2);
        assert_eq!(inventory.get_book(book.id).unwrap(), book);
    }

    #[test]
    fn test_duplicate_isbn_rejected() {
        let store = Store::in_memory().unwrap();
        let inventory = Inventory::new(store.connection());

        let first = inventory.add_book(dune()).unwrap();
        let err = inventory
            .add_book(BookDraft::new("Dune Messiah", "Herbert", 1).with_isbn("111"))
            .unwrap_err();

        assert!(matches!(err, LibraryError::ConstraintViolation(_)));
        assert_eq!(inventory.list_books().unwrap(), vec![first]);
    }

    #[test]
    fn test_books_without_isbn_do_not_collide() {
        let store = Store::in_memory().unwrap();
        let inventory = Inventory::new(store.connection());

        inventory
            .add_book(BookDraft::new("Notes", "Anon", 1).with_isbn(""))
            .unwrap();
        inventory
            .add_book(BookDraft::new("More Notes", "Anon", 1))
            .unwrap();
        assert_eq!(inventory.list_books().unwrap().len(), 2);
    }

    #[test]
    fn test_add_book_rejects_zero_copies() {
        let store = Store::in_memory().unwrap();
        let inventory = Inventory::new(store.connection());

        let err = inventory
            .add_book(BookDraft::new("Dune", "Herbert", 0))
            .unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput(_)));
        assert!(inventory.list_books().unwrap().is_empty());
    }

    #[test]
    fn test_update_book_leaves_available_untouched() {
        let store = Store::in_memory().unwrap();
        let inventory = Inventory::new(store.connection());
        let book = inventory
            .add_book(BookDraft::new("Dune", "Herbert", 5))
            .unwrap();

        let updated = inventory
            .update_book(book.id, BookDraft::new("Dune (2nd ed.)", "Frank Herbert", 2))
            .unwrap();

        assert_eq!(updated.title, "Dune (2nd ed.)");
        assert_eq!(updated.total_copies, 2);
        assert_eq!(updated.available_copies, 5);
    }

    #[test]
    fn test_update_missing_book() {
        let store = Store::in_memory().unwrap();
        let inventory = Inventory::new(store.connection());

        let err = inventory.update_book(BookId(99), dune()).unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(_)));
    }

    #[test]
    fn test_update_to_taken_isbn() {
        let store = Store::in_memory().unwrap();
        let inventory = Inventory::new(store.connection());
        inventory.add_book(dune()).unwrap();
        let other = inventory
            .add_book(BookDraft::new("Emma", "Austen", 1).with_isbn("222"))
            .unwrap();

        let err = inventory
            .update_book(other.id, BookDraft::new("Emma", "Austen", 1).with_isbn("111"))
            .unwrap_err();
        assert!(matches!(err, LibraryError::ConstraintViolation(_)));
        assert_eq!(inventory.get_book(other.id).unwrap().isbn.as_deref(), Some("222"));
    }

    #[test]
    fn test_delete_book() {
        let store = Store::in_memory().unwrap();
        let inventory = Inventory::new(store.connection());
        let book = inventory.add_book(dune()).unwrap();

        inventory.delete_book(book.id).unwrap();
        assert!(inventory.find_book(book.id).unwrap().is_none());
        assert!(matches!(
            inventory.delete_book(book.id),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn test_counter_stays_within_bounds() {
        let store = Store::in_memory().unwrap();
        let inventory = Inventory::new(store.connection());
        let book = inventory
            .add_book(BookDraft::new("Dune", "Herbert", 1))
            .unwrap();

        inventory.decrement_available(book.id).unwrap();
        let err = inventory.decrement_available(book.id).unwrap_err();
        assert!(matches!(err, LibraryError::Unavailable(_)));
        assert_eq!(inventory.get_book(book.id).unwrap().available_copies, 0);

        inventory.increment_available(book.id).unwrap();
        assert_eq!(inventory.get_book(book.id).unwrap().available_copies, 1);
    }

    #[test]
    fn test_list_available_books_skips_empty_shelves() {
        let store = Store::in_memory().unwrap();
        let inventory = Inventory::new(store.connection());
        let dune = inventory.add_book(dune()).unwrap();
        let emma = inventory
            .add_book(BookDraft::new("Emma", "Austen", 1))
            .unwrap();
        inventory.decrement_available(emma.id).unwrap();

        let options = inventory.list_available_books().unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, dune.id);
        assert_eq!(options[0].to_string(), format!("{}: Dune", dune.id));
    }
}
