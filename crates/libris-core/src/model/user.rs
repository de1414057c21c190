//! Patron records

use serde::{Deserialize, Serialize};

use super::{optional_text, record_id, required_text};
use crate::error::Result;

record_id!(
    /// Identifier of a patron (`users.user_id`)
    UserId,
    "user"
);

/// A library patron
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Unique when present
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Editable fields of a patron
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UserDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub(crate) fn validate(self) -> Result<Self> {
        Ok(Self {
            name: required_text("name", self.name)?,
            email: optional_text(self.email),
            phone: optional_text(self.phone),
        })
    }
}

/// Selection-list entry for patrons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOption {
    pub id: UserId,
    pub name: String,
}

impl std::fmt::Display for UserOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.name)
    }
}
