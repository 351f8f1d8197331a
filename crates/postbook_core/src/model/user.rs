//! User document model.
//!
//! # Invariants
//! - `name` and `email` are never blank on a stored user.
//! - A `UserProjection` always carries `id`; other fields only when requested.

use super::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

const RECORD: &str = "user";

/// Stored user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Insert input for a user; the store assigns `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Rejects blank `name` or `email`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(RECORD, "name", &self.name)?;
        require_text(RECORD, "email", &self.email)?;
        Ok(())
    }

    /// Materializes the stored document under a store-assigned id.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            avatar: self.avatar,
        }
    }
}

/// Equality filter over user fields. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

impl UserFilter {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Selectable user field for projected reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Name,
    Email,
    Avatar,
}

impl UserField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Avatar => "avatar",
        }
    }
}

/// Detached partial user returned by projected reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProjection {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
