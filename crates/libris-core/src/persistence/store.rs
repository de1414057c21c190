//! Store handle owning the SQLite connection

use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use super::schema::{Schema, SCHEMA_VERSION};
use crate::error::{Result, StoreError};

/// Durable record keeper for books, users, and loans.
///
/// Constructed once and lent to the inventory, patron, and loan components,
/// which borrow its connection for the duration of a call.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a store at the given database path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(StoreError::from)?;
            }
        }
        let conn = Connection::open(path).map_err(StoreError::from)?;
        info!(path = %path.display(), "opened library store");
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(StoreError::from)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize(&self) -> Result<()> {
        let current_version = self.get_schema_version().unwrap_or(0);

        if current_version == 0 {
            self.conn
                .execute_batch(Schema::create_tables())
                .map_err(StoreError::from)?;
            self.set_schema_version(SCHEMA_VERSION)?;
            debug!(version = SCHEMA_VERSION, "created library schema");
        } else if current_version < SCHEMA_VERSION {
            for version in current_version..SCHEMA_VERSION {
                if let Some(migration) = Schema::migration(version, version + 1) {
                    self.conn.execute_batch(migration).map_err(|e| {
                        StoreError::Migration(format!("{} -> {}: {}", version, version + 1, e))
                    })?;
                }
            }
            self.set_schema_version(SCHEMA_VERSION)?;
            info!(
                from = current_version,
                to = SCHEMA_VERSION,
                "migrated library schema"
            );
        } else if current_version > SCHEMA_VERSION {
            return Err(StoreError::Migration(format!(
                "database schema version {} is newer than supported version {}",
                current_version, SCHEMA_VERSION
            ))
            .into());
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Option<u32> {
        self.conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok()
    }

    fn set_schema_version(&self, version: u32) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )
            .map_err(StoreError::from)?;
        Ok(())
    }

    /// Schema version recorded in the database
    pub fn schema_version(&self) -> u32 {
        self.get_schema_version().unwrap_or(0)
    }

    /// Borrow the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` as one atomic unit against this store.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        in_transaction(&self.conn, f)
    }
}

/// Run `f` inside a transaction on `conn`, committing only if it returns `Ok`.
///
/// When `conn` is already inside a transaction, `f` joins it and the outer
/// owner decides whether to commit.
pub fn in_transaction<T, F>(conn: &Connection, f: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    if !conn.is_autocommit() {
        return f(conn);
    }

    let tx = conn.unchecked_transaction().map_err(StoreError::from)?;
    let value = f(&tx)?;
    tx.commit().map_err(StoreError::from)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LibraryError;

    fn count_books(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_store_creation() {
        let store = Store::in_memory().unwrap();
        assert_eq!(store.schema_version(), SCHEMA_VERSION);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let store = Store::in_memory().unwrap();
        let enabled: i64 = store
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_reopen_keeps_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("library.db");

        {
            let store = Store::open(&path).unwrap();
            store
                .connection()
                .execute(
                    "INSERT INTO books (title, author) VALUES ('Dune', 'Herbert')",
                    [],
                )
                .unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.schema_version(), SCHEMA_VERSION);
        assert_eq!(count_books(store.connection()), 1);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.db");
        {
            let store = Store::open(&path).unwrap();
            store
                .connection()
                .execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    [SCHEMA_VERSION + 1],
                )
                .unwrap();
        }

        let err = Store::open(&path).err().unwrap();
        assert!(matches!(err, LibraryError::Store(StoreError::Migration(_))));
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let store = Store::in_memory().unwrap();

        let result: Result<()> = store.transaction(|conn| {
            conn.execute(
                "INSERT INTO books (title, author) VALUES ('Dune', 'Herbert')",
                [],
            )?;
            Err(LibraryError::Unavailable("forced".into()))
        });

        assert!(result.is_err());
        assert_eq!(count_books(store.connection()), 0);
    }

    #[test]
    fn test_nested_transaction_joins_outer() {
        let store = Store::in_memory().unwrap();

        let result: Result<()> = store.transaction(|outer| {
            in_transaction(outer, |inner| {
                inner.execute(
                    "INSERT INTO books (title, author) VALUES ('Dune', 'Herbert')",
                    [],
                )?;
                Ok(())
            })?;
            Err(LibraryError::Unavailable("outer fails".into()))
        });

        assert!(result.is_err());
        assert_eq!(count_books(store.connection()), 0);
    }
}
