//! Loan workflow: issuing and returning copies
//!
//! Issuing writes an Open loan and takes a copy off the shelf; returning
//! closes the loan with its late fee and puts the copy back. Each pair of
//! writes runs in one transaction, so a loan and the counter it moved are
//! never observed out of step.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{LibraryError, Result};
use crate::inventory::Inventory;
use crate::model::{
    days_late, due_date_for, late_fee, BookId, Loan, LoanId, LoanRow, LoanState, ReturnReceipt,
    UserId,
};
use crate::patrons::Patrons;
use crate::persistence::{date_column, format_date, in_transaction, optional_date_column};

const LOAN_COLUMNS: &str =
    "issue_id, book_id, user_id, issue_date, due_date, return_date, late_fee";

const LOAN_ROW_QUERY: &str = "SELECT ib.issue_id, b.title, u.name, ib.issue_date, ib.due_date, \
     ib.return_date, ib.late_fee FROM issued_books ib \
     JOIN books b ON ib.book_id = b.book_id \
     JOIN users u ON ib.user_id = u.user_id";

/// Loan operations over a borrowed store connection
pub struct LoanDesk<'a> {
    conn: &'a Connection,
}

impl<'a> LoanDesk<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Lend one copy of `book_id` to `user_id`, due fourteen days after `today`.
    ///
    /// Fails with `Unavailable` when the book is unknown or has no copy on the
    /// shelf, then with `NotFound` for an unknown patron, and with
    /// `InvalidInput` when the due date would fall past the end of the
    /// calendar. Nothing is written then.
    pub fn issue(&self, user_id: UserId, book_id: BookId, today: NaiveDate) -> Result<Loan> {
        debug!(user = %user_id, book = %book_id, %today, "issuing book");

        let result = in_transaction(self.conn, |conn| {
            let inventory = Inventory::new(conn);
            match inventory.find_book(book_id)? {
                Some(book) if book.is_available() => {}
                Some(_) => {
                    return Err(LibraryError::Unavailable(format!(
                        "book {book_id} has no available copies"
                    )))
                }
                None => {
                    return Err(LibraryError::Unavailable(format!(
                        "book {book_id} does not exist"
                    )))
                }
            }

            if Patrons::new(conn).find_user(user_id)?.is_none() {
                return Err(LibraryError::NotFound(format!("user {user_id}")));
            }

            let due_date = due_date_for(today).ok_or_else(|| {
                LibraryError::InvalidInput(format!("no due date can follow {today}"))
            })?;
            conn.execute(
                "INSERT INTO issued_books (book_id, user_id, issue_date, due_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![book_id.0, user_id.0, format_date(today), format_date(due_date)],
            )?;
            let id = LoanId(conn.last_insert_rowid());

            inventory.decrement_available(book_id)?;

            Ok(Loan {
                id,
                book_id,
                user_id,
                issue_date: today,
                due_date,
                return_date: None,
                late_fee: 0.0,
            })
        });

        match &result {
            Ok(loan) => info!(
                loan = %loan.id,
                user = %user_id,
                book = %book_id,
                due = %loan.due_date,
                "book issued"
            ),
            Err(e) => warn!(user = %user_id, book = %book_id, error = %e, "issue rejected"),
        }
        result
    }

    /// Close an open loan on `today`, charging the late fee.
    ///
    /// Fails with `NotFound` if the loan does not exist or was already returned.
    pub fn return_loan(&self, loan_id: LoanId, today: NaiveDate) -> Result<ReturnReceipt> {
        debug!(loan = %loan_id, %today, "returning loan");

        let result = in_transaction(self.conn, |conn| {
            let loan = Self::load_loan(conn, loan_id)?
                .ok_or_else(|| LibraryError::NotFound(format!("loan {loan_id}")))?;

            if !loan.state().can_transition_to(&LoanState::Closed) {
                return Err(LibraryError::NotFound(format!(
                    "loan {loan_id} was already returned"
                )));
            }

            let days_late = days_late(loan.due_date, today);
            let late_fee = late_fee(loan.due_date, today);

            let updated = conn.execute(
                "UPDATE issued_books SET return_date = ?1, late_fee = ?2
                 WHERE issue_id = ?3 AND return_date IS NULL",
                params![format_date(today), late_fee, loan_id.0],
            )?;
            if updated == 0 {
                return Err(LibraryError::NotFound(format!(
                    "loan {loan_id} was already returned"
                )));
            }

            Inventory::new(conn).increment_available(loan.book_id)?;

            Ok(ReturnReceipt {
                loan_id,
                book_id: loan.book_id,
                returned_on: today,
                days_late,
                late_fee,
            })
        });

        match &result {
            Ok(receipt) => info!(
                loan = %loan_id,
                days_late = receipt.days_late,
                fee = receipt.late_fee,
                "book returned"
            ),
            Err(e) => warn!(loan = %loan_id, error = %e, "return rejected"),
        }
        result
    }

    pub fn get_loan(&self, id: LoanId) -> Result<Loan> {
        self.find_loan(id)?
            .ok_or_else(|| LibraryError::NotFound(format!("loan {id}")))
    }

    pub fn find_loan(&self, id: LoanId) -> Result<Option<Loan>> {
        Self::load_loan(self.conn, id)
    }

    /// Every loan, open and closed, newest first
    pub fn list_loans(&self) -> Result<Vec<LoanRow>> {
        self.query_rows(
            &format!("{LOAN_ROW_QUERY} ORDER BY ib.issue_id DESC"),
            params![],
        )
    }

    /// Loans whose copies are still out, oldest due first
    pub fn list_open_loans(&self) -> Result<Vec<LoanRow>> {
        self.query_rows(
            &format!(
                "{LOAN_ROW_QUERY} WHERE ib.return_date IS NULL ORDER BY ib.due_date, ib.issue_id"
            ),
            params![],
        )
    }

    /// Open loans past their due date on `today`, each carrying the fee accrued so far
    pub fn list_overdue(&self, today: NaiveDate) -> Result<Vec<LoanRow>> {
        let mut rows = self.query_rows(
            &format!(
                "{LOAN_ROW_QUERY} WHERE ib.return_date IS NULL AND ib.due_date < ?1 \
                 ORDER BY ib.due_date, ib.issue_id"
            ),
            params![format_date(today)],
        )?;
        for row in &mut rows {
            row.late_fee = row.fee_as_of(today);
        }
        Ok(rows)
    }

    /// Loans held by one patron, newest first
    pub fn loans_for_user(&self, user_id: UserId) -> Result<Vec<Loan>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOAN_COLUMNS} FROM issued_books WHERE user_id = ?1 ORDER BY issue_id DESC"
        ))?;

        let loans = stmt
            .query_map([user_id.0], Self::row_to_loan)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(loans)
    }

    fn load_loan(conn: &Connection, id: LoanId) -> Result<Option<Loan>> {
        let loan = conn
            .query_row(
                &format!("SELECT {LOAN_COLUMNS} FROM issued_books WHERE issue_id = ?1"),
                [id.0],
                Self::row_to_loan,
            )
            .optional()?;
        Ok(loan)
    }

    fn query_rows(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<LoanRow>> {
        let mut stmt = self.conn.prepare(sql)?;

        let rows = stmt
            .query_map(params, Self::row_to_loan_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn row_to_loan(row: &rusqlite::Row<'_>) -> rusqlite::Result<Loan> {
        Ok(Loan {
            id: LoanId(row.get(0)?),
            book_id: BookId(row.get(1)?),
            user_id: UserId(row.get(2)?),
            issue_date: date_column(row, 3)?,
            due_date: date_column(row, 4)?,
            return_date: optional_date_column(row, 5)?,
            late_fee: row.get::<_, Option<f64>>(6)?.unwrap_or_default(),
        })
    }

    fn row_to_loan_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LoanRow> {
        Ok(LoanRow {
            id: LoanId(row.get(0)?),
            book_title: row.get(1)?,
            user_name: row.get(2)?,
            issue_date: date_column(row, 3)?,
            due_date: date_column(row, 4)?,
            return_date: optional_date_column(row, 5)?,
            late_fee: row.get::<_, Option<f64>>(6)?.unwrap_or_default(),
        })
    }
}
