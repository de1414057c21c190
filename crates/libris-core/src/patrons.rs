//! Patron registry: keyed CRUD over user records

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{LibraryError, Result};
use crate::model::{User, UserDraft, UserId, UserOption};

/// Patron operations over a borrowed store connection
pub struct Patrons<'a> {
    conn: &'a Connection,
}

impl<'a> Patrons<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Register a patron
    pub fn add_user(&self, draft: UserDraft) -> Result<User> {
        let draft = draft.validate()?;
        debug!(name = %draft.name, "adding user");

        self.conn
            .execute(
                "INSERT INTO users (name, email, phone) VALUES (?1, ?2, ?3)",
                params![draft.name, draft.email, draft.phone],
            )
            .map_err(|e| {
                let err = LibraryError::from(e).on_constraint(|| duplicate_email(&draft));
                warn!(error = %err, "user rejected");
                err
            })?;

        let user = User {
            id: UserId(self.conn.last_insert_rowid()),
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
        };
        info!(user = %user.id, name = %user.name, "user added");
        Ok(user)
    }

    /// Overwrite a patron's details
    pub fn update_user(&self, id: UserId, draft: UserDraft) -> Result<User> {
        let draft = draft.validate()?;

        let updated = self
            .conn
            .execute(
                "UPDATE users SET name = ?1, email = ?2, phone = ?3 WHERE user_id = ?4",
                params![draft.name, draft.email, draft.phone, id.0],
            )
            .map_err(|e| LibraryError::from(e).on_constraint(|| duplicate_email(&draft)))?;

        if updated == 0 {
            return Err(user_not_found(id));
        }
        info!(user = %id, "user updated");
        Ok(User {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
        })
    }

    /// Remove a patron; patrons with loan history are kept
    pub fn delete_user(&self, id: UserId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE user_id = ?1", [id.0])
            .map_err(|e| {
                LibraryError::from(e)
                    .on_constraint(|| format!("user {id} is referenced by loan records"))
            })?;

        if deleted == 0 {
            return Err(user_not_found(id));
        }
        info!(user = %id, "user deleted");
        Ok(())
    }

    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.find_user(id)?.ok_or_else(|| user_not_found(id))
    }

    pub fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT user_id, name, email, phone FROM users WHERE user_id = ?1",
                [id.0],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, name, email, phone FROM users ORDER BY user_id")?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Patrons for the issue selection list
    pub fn list_user_options(&self) -> Result<Vec<UserOption>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, name FROM users ORDER BY user_id")?;

        let options = stmt
            .query_map([], |row| {
                Ok(UserOption {
                    id: UserId(row.get(0)?),
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(options)
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: UserId(row.get(0)?),
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
        })
    }
}

fn user_not_found(id: UserId) -> LibraryError {
    LibraryError::NotFound(format!("user {id}"))
}

fn duplicate_email(draft: &UserDraft) -> String {
    match &draft.email {
        Some(email) => format!("email {email} is already registered"),
        None => "user conflicts with an existing record".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Store;

    #[test]
    fn test_user_crud() {
        let store = Store::in_memory().unwrap();
        let patrons = Patrons::new(store.connection());

        let alice = patrons
            .add_user(UserDraft::new("Alice").with_email("a@x.com"))
            .unwrap();
        assert_eq!(patrons.get_user(alice.id).unwrap(), alice);

        let renamed = patrons
            .update_user(
                alice.id,
                UserDraft::new("Alice Liddell")
                    .with_email("a@x.com")
                    .with_phone("555-0100"),
            )
            .unwrap();
        assert_eq!(patrons.get_user(alice.id).unwrap(), renamed);

        patrons.delete_user(alice.id).unwrap();
        assert!(patrons.find_user(alice.id).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected_on_add() {
        let store = Store::in_memory().unwrap();
        let patrons = Patrons::new(store.connection());
        patrons
            .add_user(UserDraft::new("Alice").with_email("a@x.com"))
            .unwrap();

        let err = patrons
            .add_user(UserDraft::new("Impostor").with_email("a@x.com"))
            .unwrap_err();
        assert!(matches!(err, LibraryError::ConstraintViolation(_)));
        assert_eq!(patrons.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_email_rejected_on_update() {
        let store = Store::in_memory().unwrap();
        let patrons = Patrons::new(store.connection());
        patrons
            .add_user(UserDraft::new("Alice").with_email("a@x.com"))
            .unwrap();
        let bob = patrons
            .add_user(UserDraft::new("Bob").with_email("b@x.com"))
            .unwrap();

        let err = patrons
            .update_user(bob.id, UserDraft::new("Bob").with_email("a@x.com"))
            .unwrap_err();
        assert!(matches!(err, LibraryError::ConstraintViolation(_)));
        assert_eq!(patrons.get_user(bob.id).unwrap(), bob);
    }

    #[test]
    fn test_users_without_email_do_not_collide() {
        let store = Store::in_memory().unwrap();
        let patrons = Patrons::new(store.connection());
        patrons.add_user(UserDraft::new("Carol").with_email("")).unwrap();
        patrons.add_user(UserDraft::new("Dave")).unwrap();

        let options = patrons.list_user_options().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].name, "Dave");
    }

    #[test]
    fn test_missing_user() {
        let store = Store::in_memory().unwrap();
        let patrons = Patrons::new(store.connection());

        assert!(matches!(
            patrons.update_user(UserId(7), UserDraft::new("Ghost")),
            Err(LibraryError::NotFound(_))
        ));
        assert!(matches!(
            patrons.delete_user(UserId(7)),
            Err(LibraryError::NotFound(_))
        ));
    }
}
