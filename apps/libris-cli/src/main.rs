//! Libris CLI
//!
//! Command-line front desk over `libris-core`: catalogue, patrons, and the
//! issue/return counter.

mod cli;

use clap::Parser;
use libris_core::{today, Book, Library, LibraryConfig, LoanRow, User};
use tracing::debug;

use cli::{BookAction, Cli, Command, UserAction};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = LibraryConfig::load_or_default(cli.config.as_deref())?;
    if let Some(db) = cli.db.clone() {
        config.database.path = db;
    }
    setup_tracing(&config.logging.filter, cli.verbose);
    debug!(db = %config.database.path.display(), "using database");

    let library = Library::from_config(&config)?;
    run(&library, cli.command)?;
    Ok(())
}

fn setup_tracing(filter: &str, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(library: &Library, command: Command) -> libris_core::Result<()> {
    match command {
        Command::Book { action } => match action {
            BookAction::Add(fields) => {
                let book = library.add_book(fields.into())?;
                println!("Book added with id {}", book.id);
            }
            BookAction::Update { id, fields } => {
                let book = library.update_book(id, fields.into())?;
                println!("Book {} updated", book.id);
            }
            BookAction::Delete { id } => {
                library.delete_book(id)?;
                println!("Book {id} deleted");
            }
            BookAction::List => print_books(&library.list_books()?),
        },
        Command::User { action } => match action {
            UserAction::Add(fields) => {
                let user = library.add_user(fields.into())?;
                println!("User added with id {}", user.id);
            }
            UserAction::Update { id, fields } => {
                let user = library.update_user(id, fields.into())?;
                println!("User {} updated", user.id);
            }
            UserAction::Delete { id } => {
                library.delete_user(id)?;
                println!("User {id} deleted");
            }
            UserAction::List => print_users(&library.list_users()?),
        },
        Command::Issue { user, book, date } => {
            let loan = library.issue_on(user, book, date.unwrap_or_else(today))?;
            println!("Book issued (loan {}). Due date: {}", loan.id, loan.due_date);
        }
        Command::Return { loan, date } => {
            let receipt = library.return_loan_on(loan, date.unwrap_or_else(today))?;
            println!("Book returned (loan {})", receipt.loan_id);
            if receipt.late_fee > 0.0 {
                println!(
                    "Late fee: {:.2} ({} days late)",
                    receipt.late_fee, receipt.days_late
                );
            }
        }
        Command::Loans { open, overdue } => {
            let rows = if overdue {
                library.list_overdue_loans(today())?
            } else if open {
                library.list_open_loans()?
            } else {
                library.list_loans()?
            };
            print_loans(&rows);
        }
        Command::Options => {
            println!("Users:");
            for user in library.list_users_for_issue()? {
                println!("  {user}");
            }
            println!("Books available:");
            for book in library.list_available_books_for_issue()? {
                println!("  {book}");
            }
        }
    }
    Ok(())
}

fn print_books(books: &[Book]) {
    println!(
        "{:>5}  {:<30}  {:<20}  {:<14}  {:>5}  {:>9}",
        "ID", "Title", "Author", "ISBN", "Total", "Available"
    );
    for book in books {
        println!(
            "{:>5}  {:<30}  {:<20}  {:<14}  {:>5}  {:>9}",
            book.id,
            book.title,
            book.author,
            book.isbn.as_deref().unwrap_or(""),
            book.total_copies,
            book.available_copies
        );
    }
}

fn print_users(users: &[User]) {
    println!("{:>5}  {:<24}  {:<28}  {:<14}", "ID", "Name", "Email", "Phone");
    for user in users {
        println!(
            "{:>5}  {:<24}  {:<28}  {:<14}",
            user.id,
            user.name,
            user.email.as_deref().unwrap_or(""),
            user.phone.as_deref().unwrap_or("")
        );
    }
}

fn print_loans(rows: &[LoanRow]) {
    println!(
        "{:>5}  {:<30}  {:<20}  {:<10}  {:<10}  {:<10}  {:>8}",
        "ID", "Book", "User", "Issued", "Due", "Returned", "Late fee"
    );
    for row in rows {
        let returned = row
            .return_date
            .map(|d| d.to_string())
            .unwrap_or_default();
        println!(
            "{:>5}  {:<30}  {:<20}  {:<10}  {:<10}  {:<10}  {:>8.2}",
            row.id, row.book_title, row.user_name, row.issue_date, row.due_date, returned, row.late_fee
        );
    }
}
