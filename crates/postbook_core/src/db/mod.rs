//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Resolve configured store locations into SQLite connections.
//! - Apply schema migrations in deterministic order.
//! - Own the process-wide store handle and its release.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories must not read/write documents before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod location;
pub mod migrations;
mod open;
mod store;

pub use location::StoreLocation;
pub use open::{open_db, open_db_in_memory};
pub use store::Store;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Store URI uses a scheme this build cannot open.
    UnsupportedLocation(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UnsupportedLocation(uri) => write!(
                f,
                "unsupported store location `{uri}`; expected sqlite://<path>, sqlite::memory: or a file path"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::UnsupportedLocation(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
