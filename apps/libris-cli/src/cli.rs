use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use libris_core::{BookDraft, BookId, LoanId, UserDraft, UserId};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "libris")]
#[command(about = "Front desk for a small lending library")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to <config dir>/libris/config.toml when present)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configured one
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the catalogue
    Book {
        #[command(subcommand)]
        action: BookAction,
    },
    /// Manage patrons
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Lend a book to a patron
    Issue {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        book: BookId,
        /// Issue date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Take a book back and charge any late fee
    Return {
        loan: LoanId,
        /// Return date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List loans
    Loans {
        /// Only loans not yet returned
        #[arg(long, conflicts_with = "overdue")]
        open: bool,
        /// Only open loans past their due date
        #[arg(long)]
        overdue: bool,
    },
    /// Show who and what can be picked for an issue
    Options,
}

#[derive(Subcommand, Debug)]
pub enum BookAction {
    /// Catalogue a new book
    Add(BookFields),
    /// Replace a book's details (available copies are left as they are)
    Update {
        id: BookId,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Remove a book
    Delete { id: BookId },
    /// List all books
    List,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Register a patron
    Add(UserFields),
    /// Replace a patron's details
    Update {
        id: UserId,
        #[command(flatten)]
        fields: UserFields,
    },
    /// Remove a patron
    Delete { id: UserId },
    /// List all patrons
    List,
}

#[derive(Args, Debug)]
pub struct BookFields {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    #[arg(long)]
    pub isbn: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub copies: i64,
}

impl From<BookFields> for BookDraft {
    fn from(fields: BookFields) -> Self {
        BookDraft {
            title: fields.title,
            author: fields.author,
            isbn: fields.isbn,
            total_copies: fields.copies,
        }
    }
}

#[derive(Args, Debug)]
pub struct UserFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

impl From<UserFields> for UserDraft {
    fn from(fields: UserFields) -> Self {
        UserDraft {
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_issue() {
        let cli = Cli::parse_from([
            "libris", "issue", "--user", "1", "--book", "2", "--date", "2024-01-01",
        ]);
        match cli.command {
            Command::Issue { user, book, date } => {
                assert_eq!(user, UserId(1));
                assert_eq!(book, BookId(2));
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_id_is_rejected() {
        assert!(Cli::try_parse_from(["libris", "return", "3: Dune"]).is_err());
    }

    #[test]
    fn test_book_add_defaults_to_one_copy() {
        let cli = Cli::parse_from(["libris", "book", "add", "--title", "Dune", "--author", "Herbert"]);
        match cli.command {
            Command::Book {
                action: BookAction::Add(fields),
            } => {
                let draft = BookDraft::from(fields);
                assert_eq!(draft.total_copies, 1);
                assert_eq!(draft.isbn, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
