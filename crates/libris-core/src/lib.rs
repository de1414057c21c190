//! Libris Core - book inventory, patrons, and loans for a small library
//!
//! This crate provides the core functionality behind the libris front ends:
//!
//! - **Inventory**: Book records with total/available copy counters
//! - **Patrons**: User records keyed by id, unique by email
//! - **Loans**: Issue and return workflow (Open→Closed), due dates, late fees
//! - **Persistence**: SQLite store with a versioned schema
//! - **Library**: Facade exposing every operation a front end needs
//! - **Config**: Database location and logging filter
//!
//! # Loan lifecycle
//!
//! ```text
//! issue:  Open loan, due = issue date + 14 days, available_copies - 1
//! return: Closed loan, fee = max(0, days late) * 5, available_copies + 1
//! ```
//!
//! Both steps of issue and of return commit together or not at all.

pub mod config;
pub mod error;
pub mod inventory;
pub mod library;
pub mod loans;
pub mod model;
pub mod patrons;
pub mod persistence;

pub use config::{ConfigError, DatabaseConfig, LibraryConfig, LoggingConfig};
pub use error::{LibraryError, Result, StoreError};
pub use inventory::Inventory;
pub use library::{today, Library};
pub use loans::LoanDesk;
pub use model::{
    Book, BookDraft, BookId, BookOption, Loan, LoanId, LoanRow, LoanState, ReturnReceipt, User,
    UserDraft, UserId, UserOption, FEE_PER_DAY, LOAN_PERIOD_DAYS,
};
pub use patrons::Patrons;
pub use persistence::{Schema, Store};
