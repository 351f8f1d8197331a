//! Process-wide store handle.
//!
//! # Invariants
//! - One `Store` owns exactly one migrated connection.
//! - The connection is released by `close()` or, on early exits, by `Drop`.

use super::{open_db, open_db_in_memory, DbError, DbResult, StoreLocation};
use log::{error, info};
use rusqlite::Connection;

/// Opened document store, passed by reference to repositories.
pub struct Store {
    conn: Connection,
    location: StoreLocation,
}

impl Store {
    /// Connects to `location` and applies pending migrations.
    pub fn open(location: &StoreLocation) -> DbResult<Self> {
        let conn = match location {
            StoreLocation::Memory => open_db_in_memory()?,
            StoreLocation::File(path) => open_db(path)?,
        };

        Ok(Self {
            conn,
            location: location.clone(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Releases the connection and reports any error SQLite raises on close.
    pub fn close(self) -> DbResult<()> {
        let location = self.location;
        match self.conn.close() {
            Ok(()) => {
                info!("event=db_close module=db status=ok location={location}");
                Ok(())
            }
            Err((_, err)) => {
                error!(
                    "event=db_close module=db status=error location={location} error={err}"
                );
                Err(DbError::Sqlite(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Store;
    use crate::db::StoreLocation;

    #[test]
    fn memory_store_opens_and_closes() {
        let store = Store::open(&StoreLocation::Memory).unwrap();
        assert_eq!(store.location(), &StoreLocation::Memory);

        let tables: i64 = store
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'posts');",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);

        store.close().unwrap();
    }
}
