//! Store location parsing.
//!
//! Accepted forms:
//! - `sqlite::memory:` or `:memory:` for a private in-memory store.
//! - `sqlite://<path>` for a file-backed store.
//! - A bare filesystem path.

use super::DbError;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

const SQLITE_SCHEME: &str = "sqlite://";
const MEMORY_FORMS: [&str; 2] = ["sqlite::memory:", ":memory:"];

/// Where the document store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl FromStr for StoreLocation {
    type Err = DbError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DbError::UnsupportedLocation(value.to_string()));
        }

        if MEMORY_FORMS.contains(&trimmed) {
            return Ok(Self::Memory);
        }

        if let Some(path) = trimmed.strip_prefix(SQLITE_SCHEME) {
            if path.is_empty() {
                return Err(DbError::UnsupportedLocation(value.to_string()));
            }
            return Ok(Self::File(PathBuf::from(path)));
        }

        if trimmed.contains("://") {
            return Err(DbError::UnsupportedLocation(value.to_string()));
        }

        Ok(Self::File(PathBuf::from(trimmed)))
    }
}

impl Display for StoreLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "sqlite::memory:"),
            Self::File(path) => write!(f, "{SQLITE_SCHEME}{}", path.display()),
        }
    }
}
