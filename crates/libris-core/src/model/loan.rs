//! Loan records and the loan state machine
//!
//! State transitions:
//! ```text
//! Open → Closed
//! ```
//!
//! A loan is created Open when a copy is issued and becomes Closed exactly
//! once, when the copy comes back and the late fee is fixed.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{record_id, BookId, UserId};

record_id!(
    /// Identifier of a loan (`issued_books.issue_id`)
    LoanId,
    "loan"
);

/// Length of every loan in days
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Late fee charged per day past the due date, in currency units
pub const FEE_PER_DAY: f64 = 5.0;

/// Due date of a loan issued on `issue_date`, or `None` past the end of the calendar
pub fn due_date_for(issue_date: NaiveDate) -> Option<NaiveDate> {
    issue_date.checked_add_signed(Duration::days(LOAN_PERIOD_DAYS))
}

/// Whole days between `due_date` and `returned_on`, never negative
pub fn days_late(due_date: NaiveDate, returned_on: NaiveDate) -> i64 {
    (returned_on - due_date).num_days().max(0)
}

/// Fee owed when a loan due on `due_date` comes back on `returned_on`
pub fn late_fee(due_date: NaiveDate, returned_on: NaiveDate) -> f64 {
    days_late(due_date, returned_on) as f64 * FEE_PER_DAY
}

/// The state of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanState {
    /// Copy is out with the patron
    Open,
    /// Copy returned, late fee finalised
    Closed,
}

impl LoanState {
    /// Check if a state transition is valid
    pub fn can_transition_to(&self, target: &LoanState) -> bool {
        matches!((self, target), (LoanState::Open, LoanState::Closed))
    }

    /// Check if the loan can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanState::Closed)
    }

    /// Get a human-readable description of the state
    pub fn description(&self) -> &'static str {
        match self {
            LoanState::Open => "On loan, not yet returned",
            LoanState::Closed => "Returned",
        }
    }

    fn from_return_date(return_date: Option<NaiveDate>) -> Self {
        match return_date {
            Some(_) => LoanState::Closed,
            None => LoanState::Open,
        }
    }
}

impl std::fmt::Display for LoanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanState::Open => write!(f, "OPEN"),
            LoanState::Closed => write!(f, "CLOSED"),
        }
    }
}

/// One copy of a book lent to one patron
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub late_fee: f64,
}

impl Loan {
    pub fn state(&self) -> LoanState {
        LoanState::from_return_date(self.return_date)
    }

    pub fn is_open(&self) -> bool {
        self.state() == LoanState::Open
    }

    /// Fee the patron would owe if the copy came back on `today`.
    ///
    /// Closed loans report the fee that was charged.
    pub fn fee_as_of(&self, today: NaiveDate) -> f64 {
        match self.return_date {
            Some(_) => self.late_fee,
            None => late_fee(self.due_date, today),
        }
    }
}

/// Outcome of returning a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnReceipt {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub returned_on: NaiveDate,
    pub days_late: i64,
    pub late_fee: f64,
}

/// Loan joined with the book title and patron name, for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRow {
    pub id: LoanId,
    pub book_title: String,
    pub user_name: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub late_fee: f64,
}

impl LoanRow {
    pub fn state(&self) -> LoanState {
        LoanState::from_return_date(self.return_date)
    }

    /// Whether the copy is still out past its due date on `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.return_date.is_none() && today > self.due_date
    }

    /// Fee accrued by `today` for an open loan, or the fee charged for a closed one
    pub fn fee_as_of(&self, today: NaiveDate) -> f64 {
        match self.return_date {
            Some(_) => self.late_fee,
            None => late_fee(self.due_date, today),
        }
    }
}
