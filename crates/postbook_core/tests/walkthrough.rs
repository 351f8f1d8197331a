use postbook_core::{
    AuthorSource, PopulateOptions, PostAuthor, PostRepository, SqlitePostRepository,
    SqliteUserRepository, Store, StoreLocation, Walkthrough, WalkthroughError,
};
use std::io::{self, Cursor};
use uuid::Uuid;

const LABELS: [&str; 10] = [
    "new_user",
    "created_user",
    "user_by_id",
    "user_by_filter",
    "user_projection",
    "created_post",
    "populated_post",
    "updated_post",
    "deleted_post",
    "all_posts",
];

fn walkthrough(store: &Store) -> Walkthrough<SqliteUserRepository<'_>, SqlitePostRepository<'_>> {
    Walkthrough::new(
        SqliteUserRepository::try_new(store.connection()).unwrap(),
        SqlitePostRepository::try_new(store.connection()).unwrap(),
    )
}

#[test]
fn full_sequence_creates_updates_and_deletes_the_post() {
    let store = Store::open(&StoreLocation::Memory).unwrap();
    let mut input = io::empty();
    let mut output = Vec::new();

    let report = walkthrough(&store)
        .run(AuthorSource::CreatedUser, &mut input, &mut output)
        .unwrap();

    assert_eq!(report.user.name, "Bill");
    assert_eq!(report.user.email, "bill@initech.com");
    assert_eq!(report.post.title, "Primer Post");
    assert_eq!(report.post.author, PostAuthor::Id(report.user.id));
    assert!(report.post.comments.is_empty());

    let updated = report.updated_post.unwrap();
    assert_eq!(updated.title, "Post Actualizado");
    assert_eq!(updated.content, report.post.content);

    let deleted = report.deleted_post.unwrap();
    assert_eq!(deleted.id, report.post.id);
    assert_eq!(deleted.title, "Post Actualizado");

    assert!(report
        .remaining_posts
        .iter()
        .all(|post| post.id != report.post.id));

    let text = String::from_utf8(output).unwrap();
    let mut cursor = 0;
    for label in LABELS {
        let found = text[cursor..]
            .find(&format!("{label} "))
            .unwrap_or_else(|| panic!("missing `{label}` in output"));
        cursor += found + label.len();
    }
    assert!(!text.contains("Enter author id"));

    store.close().unwrap();
}

#[test]
fn projection_step_prints_no_avatar() {
    let store = Store::open(&StoreLocation::Memory).unwrap();
    let mut output = Vec::new();

    walkthrough(&store)
        .run(
            AuthorSource::CreatedUser,
            &mut io::empty(),
            &mut output,
        )
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    let start = text.find("user_projection ").unwrap() + "user_projection ".len();
    let end = text.find("created_post ").unwrap();
    let projection: serde_json::Value = serde_json::from_str(text[start..end].trim()).unwrap();

    assert_eq!(projection["name"], "Bill");
    assert_eq!(projection["email"], "bill@initech.com");
    assert!(projection.get("avatar").is_none());
}

#[test]
fn earlier_posts_survive_and_are_listed_with_authors() {
    let store = Store::open(&StoreLocation::Memory).unwrap();
    let first = walkthrough(&store)
        .run(
            AuthorSource::CreatedUser,
            &mut io::empty(),
            &mut io::sink(),
        )
        .unwrap();
    assert!(first.remaining_posts.is_empty());

    let posts = SqlitePostRepository::try_new(store.connection()).unwrap();
    let kept = posts
        .create_post(&postbook_core::NewPost::new("kept", "body", first.user.id))
        .unwrap();

    let second = walkthrough(&store)
        .run(
            AuthorSource::CreatedUser,
            &mut io::empty(),
            &mut io::sink(),
        )
        .unwrap();
    assert_eq!(second.remaining_posts.len(), 1);
    assert_eq!(second.remaining_posts[0].id, kept.id);
    assert_eq!(second.remaining_posts[0].author.user(), Some(&first.user));

    let listed = posts.list_posts(PopulateOptions::default()).unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn prompt_source_uses_typed_author_id() {
    let store = Store::open(&StoreLocation::Memory).unwrap();
    let typed = Uuid::new_v4();
    let mut input = Cursor::new(format!("{typed}\n").into_bytes());
    let mut output = Vec::new();

    let report = walkthrough(&store)
        .run(AuthorSource::Prompt, &mut input, &mut output)
        .unwrap();

    assert_eq!(report.post.author, PostAuthor::Id(typed));
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Enter author id: "));
    assert!(text.contains("\"author\": null"));
}

#[test]
fn invalid_prompt_input_aborts_before_creating_a_post() {
    let store = Store::open(&StoreLocation::Memory).unwrap();
    let mut input = Cursor::new(b"12345\n".to_vec());

    let err = walkthrough(&store)
        .run(AuthorSource::Prompt, &mut input, &mut io::sink())
        .unwrap_err();
    assert!(matches!(err, WalkthroughError::InvalidAuthorId(value) if value == "12345"));

    let posts = SqlitePostRepository::try_new(store.connection()).unwrap();
    assert!(posts.list_posts(PopulateOptions::default()).unwrap().is_empty());
}

#[test]
fn explicit_source_is_used_as_is() {
    let store = Store::open(&StoreLocation::Memory).unwrap();
    let configured = Uuid::new_v4();

    let report = walkthrough(&store)
        .run(
            AuthorSource::Explicit(configured),
            &mut io::empty(),
            &mut io::sink(),
        )
        .unwrap();

    assert_eq!(report.post.author.id(), Some(configured));
    assert_ne!(configured, report.user.id);
}
