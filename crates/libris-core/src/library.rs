//! Library facade: the operations a front end calls
//!
//! Owns the [`Store`] for the lifetime of the process and lends its
//! connection to the inventory, patron, and loan components per call.

use std::path::Path;

use chrono::NaiveDate;

use crate::config::LibraryConfig;
use crate::error::Result;
use crate::inventory::Inventory;
use crate::loans::LoanDesk;
use crate::model::{
    Book, BookDraft, BookId, BookOption, Loan, LoanId, LoanRow, ReturnReceipt, User, UserDraft,
    UserId, UserOption,
};
use crate::patrons::Patrons;
use crate::persistence::Store;

/// Entry point for front ends
pub struct Library {
    store: Store,
}

impl Library {
    /// Open the library database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_store(Store::open(path)?))
    }

    /// Open the database named by the configuration
    pub fn from_config(config: &LibraryConfig) -> Result<Self> {
        Self::open(&config.database.path)
    }

    /// Create an in-memory library (for testing)
    pub fn in_memory() -> Result<Self> {
        Ok(Self::with_store(Store::in_memory()?))
    }

    pub fn with_store(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn inventory(&self) -> Inventory<'_> {
        Inventory::new(self.store.connection())
    }

    pub fn patrons(&self) -> Patrons<'_> {
        Patrons::new(self.store.connection())
    }

    pub fn loans(&self) -> LoanDesk<'_> {
        LoanDesk::new(self.store.connection())
    }

    // ==================== Books ====================

    pub fn add_book(&self, draft: BookDraft) -> Result<Book> {
        self.inventory().add_book(draft)
    }

    pub fn update_book(&self, id: BookId, draft: BookDraft) -> Result<Book> {
        self.inventory().update_book(id, draft)
    }

    pub fn delete_book(&self, id: BookId) -> Result<()> {
        self.inventory().delete_book(id)
    }

    pub fn get_book(&self, id: BookId) -> Result<Book> {
        self.inventory().get_book(id)
    }

    pub fn list_books(&self) -> Result<Vec<Book>> {
        self.inventory().list_books()
    }

    /// Books that can be issued right now
    pub fn list_available_books_for_issue(&self) -> Result<Vec<BookOption>> {
        self.inventory().list_available_books()
    }

    // ==================== Users ====================

    pub fn add_user(&self, draft: UserDraft) -> Result<User> {
        self.patrons().add_user(draft)
    }

    pub fn update_user(&self, id: UserId, draft: UserDraft) -> Result<User> {
        self.patrons().update_user(id, draft)
    }

    pub fn delete_user(&self, id: UserId) -> Result<()> {
        self.patrons().delete_user(id)
    }

    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.patrons().get_user(id)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.patrons().list_users()
    }

    pub fn list_users_for_issue(&self) -> Result<Vec<UserOption>> {
        self.patrons().list_user_options()
    }

    // ==================== Loans ====================

    /// Issue a book today (local calendar date)
    pub fn issue(&self, user_id: UserId, book_id: BookId) -> Result<Loan> {
        self.issue_on(user_id, book_id, today())
    }

    pub fn issue_on(&self, user_id: UserId, book_id: BookId, date: NaiveDate) -> Result<Loan> {
        self.loans().issue(user_id, book_id, date)
    }

    /// Return a loan today (local calendar date)
    pub fn return_loan(&self, loan_id: LoanId) -> Result<ReturnReceipt> {
        self.return_loan_on(loan_id, today())
    }

    pub fn return_loan_on(&self, loan_id: LoanId, date: NaiveDate) -> Result<ReturnReceipt> {
        self.loans().return_loan(loan_id, date)
    }

    pub fn get_loan(&self, id: LoanId) -> Result<Loan> {
        self.loans().get_loan(id)
    }

    /// Open and closed loans with book titles and patron names
    pub fn list_loans(&self) -> Result<Vec<LoanRow>> {
        self.loans().list_loans()
    }

    pub fn list_open_loans(&self) -> Result<Vec<LoanRow>> {
        self.loans().list_open_loans()
    }

    pub fn list_overdue_loans(&self, date: NaiveDate) -> Result<Vec<LoanRow>> {
        self.loans().list_overdue(date)
    }
}

/// Current local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
