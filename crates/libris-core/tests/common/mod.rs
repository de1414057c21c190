//! Shared fixtures for integration tests

use chrono::NaiveDate;
use libris_core::{Book, BookDraft, Library, User, UserDraft};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory library holding Dune (isbn 111, two copies) and patron Alice
pub fn dune_and_alice() -> (Library, Book, User) {
    let library = Library::in_memory().unwrap();
    let book = library
        .add_book(BookDraft::new("Dune", "Herbert", 2).with_isbn("111"))
        .unwrap();
    let user = library
        .add_user(UserDraft::new("Alice").with_email("a@x.com"))
        .unwrap();
    (library, book, user)
}

/// Every book satisfies `0 <= available <= total`
#[allow(dead_code)]
pub fn assert_counters_in_bounds(library: &Library) {
    for book in library.list_books().unwrap() {
        assert!(
            book.available_copies >= 0 && book.available_copies <= book.total_copies,
            "counter out of bounds for {:?}",
            book
        );
    }
}
