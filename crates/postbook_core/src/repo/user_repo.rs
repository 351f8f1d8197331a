//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - `find_user*` return the first match in insertion order.
//! - Projected reads select only `id` plus the requested columns.

use crate::model::user::{NewUser, User, UserField, UserFilter, UserId, UserProjection};
use crate::repo::{ensure_collection_ready, parse_uuid, RepoResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const USER_COLUMNS: [&str; 4] = ["id", "name", "email", "avatar"];
const USER_SELECT_SQL: &str = "SELECT id, name, email, avatar FROM users";

/// Data-access contract for the `users` collection.
pub trait UserRepository {
    /// Inserts a user under a freshly assigned id.
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn find_user_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Returns the first user matching every set field of `filter`.
    fn find_user(&self, filter: &UserFilter) -> RepoResult<Option<User>>;
    /// Like `find_user`, restricted to `id` plus `fields`.
    fn find_user_projected(
        &self,
        filter: &UserFilter,
        fields: &[UserField],
    ) -> RepoResult<Option<UserProjection>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_collection_ready(conn, "users", &USER_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        user.validate()?;

        let created = user.clone().into_user(Uuid::new_v4());
        self.conn.execute(
            "INSERT INTO users (id, name, email, avatar) VALUES (?1, ?2, ?3, ?4);",
            params![
                created.id.to_string(),
                created.name.as_str(),
                created.email.as_str(),
                created.avatar.as_deref(),
            ],
        )?;

        debug!("event=user_create module=repo status=ok user_id={}", created.id);
        Ok(created)
    }

    fn find_user_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn find_user(&self, filter: &UserFilter) -> RepoResult<Option<User>> {
        let (where_sql, bind_values) = filter_clause(filter);
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}{where_sql} ORDER BY rowid ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn find_user_projected(
        &self,
        filter: &UserFilter,
        fields: &[UserField],
    ) -> RepoResult<Option<UserProjection>> {
        let mut selected: Vec<UserField> = Vec::with_capacity(fields.len());
        for field in fields {
            if !selected.contains(field) {
                selected.push(*field);
            }
        }

        let mut columns = String::from("id");
        for field in &selected {
            columns.push_str(", ");
            columns.push_str(field.column());
        }

        let (where_sql, bind_values) = filter_clause(filter);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {columns} FROM users{where_sql} ORDER BY rowid ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let id_text: String = row.get("id")?;
        let mut projection = UserProjection {
            id: parse_uuid(&id_text, "users.id")?,
            name: None,
            email: None,
            avatar: None,
        };
        for field in selected {
            match field {
                UserField::Name => projection.name = Some(row.get("name")?),
                UserField::Email => projection.email = Some(row.get("email")?),
                UserField::Avatar => projection.avatar = row.get("avatar")?,
            }
        }

        Ok(Some(projection))
    }
}

fn filter_clause(filter: &UserFilter) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    for (column, value) in [
        ("name", &filter.name),
        ("email", &filter.email),
        ("avatar", &filter.avatar),
    ] {
        if let Some(value) = value {
            sql.push_str(&format!(" AND {column} = ?"));
            bind_values.push(Value::Text(value.clone()));
        }
    }

    (sql, bind_values)
}

pub(crate) fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        avatar: row.get("avatar")?,
    })
}
