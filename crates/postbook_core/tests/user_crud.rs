use postbook_core::db::migrations::latest_version;
use postbook_core::db::open_db_in_memory;
use postbook_core::{
    NewUser, RepoError, SqliteUserRepository, UserField, UserFilter, UserRepository,
    ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn bill() -> NewUser {
    NewUser::new("Bill", "bill@initech.com").with_avatar("https://i.imgur.com/dM7Thhn.png")
}

#[test]
fn create_and_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let input = bill();
    let created = repo.create_user(&input).unwrap();
    let loaded = repo.find_user_by_id(created.id).unwrap().unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.name, input.name);
    assert_eq!(loaded.email, input.email);
    assert_eq!(loaded.avatar, input.avatar);
}

#[test]
fn create_assigns_distinct_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let first = repo.create_user(&bill()).unwrap();
    let second = repo.create_user(&bill()).unwrap();
    assert_ne!(first.id, second.id);
}

#[test]
fn create_rejects_missing_required_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let err = repo
        .create_user(&NewUser::new("", "bill@initech.com"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingField {
            record: "user",
            field: "name"
        })
    ));

    let err = repo.create_user(&NewUser::new("Bill", " ")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingField { field: "email", .. })
    ));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn find_by_unknown_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    assert!(repo.find_user_by_id(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn find_one_returns_first_match_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let first = repo.create_user(&bill()).unwrap();
    repo.create_user(&NewUser::new("Bill", "bill@other.example"))
        .unwrap();
    repo.create_user(&NewUser::new("Peter", "peter@initech.com"))
        .unwrap();

    let found = repo
        .find_user(&UserFilter::default().name("Bill"))
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first.id);

    let by_two_fields = repo
        .find_user(
            &UserFilter::default()
                .name("Bill")
                .email("bill@other.example"),
        )
        .unwrap()
        .unwrap();
    assert_eq!(by_two_fields.email, "bill@other.example");

    assert!(repo
        .find_user(&UserFilter::default().name("Milton"))
        .unwrap()
        .is_none());
}

#[test]
fn projected_find_omits_unrequested_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let created = repo.create_user(&bill()).unwrap();
    let projection = repo
        .find_user_projected(
            &UserFilter::default().name("Bill"),
            &[UserField::Name, UserField::Email],
        )
        .unwrap()
        .unwrap();

    assert_eq!(projection.id, created.id);
    assert_eq!(projection.name.as_deref(), Some("Bill"));
    assert_eq!(projection.email.as_deref(), Some("bill@initech.com"));
    assert!(projection.avatar.is_none());

    let json = serde_json::to_value(&projection).unwrap();
    let object = json.as_object().unwrap();
    assert!(!object.contains_key("avatar"));
    assert_eq!(object.len(), 3);
}

#[test]
fn projected_find_can_select_avatar_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.create_user(&bill()).unwrap();
    let projection = repo
        .find_user_projected(
            &UserFilter::default().email("bill@initech.com"),
            &[UserField::Avatar, UserField::Avatar],
        )
        .unwrap()
        .unwrap();

    assert!(projection.name.is_none());
    assert!(projection.email.is_none());
    assert_eq!(
        projection.avatar.as_deref(),
        Some("https://i.imgur.com/dM7Thhn.png")
    );
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteUserRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteUserRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "users",
            column: "avatar"
        })
    ));
}
