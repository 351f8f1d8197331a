//! Post repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `posts` collection.
//! - Resolve the `author` reference with a join when asked to.
//! - Keep embedded comments inline as a JSON array column.
//!
//! # Invariants
//! - An author id with no matching user resolves to `PostAuthor::Missing`.
//! - Listing follows insertion order.
//! - `delete_post_by_id` returns the document as it was before removal.

use crate::model::post::{
    Comment, NewComment, NewPost, PopulateOptions, Post, PostAuthor, PostId, PostPatch,
};
use crate::model::user::User;
use crate::repo::{ensure_collection_ready, parse_uuid, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const POST_COLUMNS: [&str; 6] = ["id", "title", "content", "author", "comments", "created_at"];

const POST_FIELDS_SQL: &str = "p.id AS id,
    p.title AS title,
    p.content AS content,
    p.author AS author,
    p.comments AS comments,
    p.created_at AS created_at";

const AUTHOR_FIELDS_SQL: &str = "u.id AS author_user_id,
    u.name AS author_name,
    u.email AS author_email,
    u.avatar AS author_avatar";

/// Data-access contract for the `posts` collection.
pub trait PostRepository {
    /// Inserts a post under a freshly assigned id.
    fn create_post(&self, post: &NewPost) -> RepoResult<Post>;
    fn find_post_by_id(&self, id: PostId, populate: PopulateOptions) -> RepoResult<Option<Post>>;
    /// Applies `patch` and returns the post as stored afterwards.
    fn update_post_by_id(&self, id: PostId, patch: &PostPatch) -> RepoResult<Option<Post>>;
    fn delete_post_by_id(&self, id: PostId) -> RepoResult<Option<Post>>;
    fn list_posts(&self, populate: PopulateOptions) -> RepoResult<Vec<Post>>;
    /// Appends one embedded comment and returns the updated post.
    fn push_comment(&self, id: PostId, comment: &NewComment) -> RepoResult<Option<Post>>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_collection_ready(conn, "posts", &POST_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, post: &NewPost) -> RepoResult<Post> {
        let created = post.clone().into_post(Uuid::new_v4())?;
        let author = created
            .author
            .id()
            .ok_or_else(|| RepoError::InvalidData("new post has no author id".to_string()))?;

        self.conn.execute(
            "INSERT INTO posts (id, title, content, author, comments, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                created.id.to_string(),
                created.title.as_str(),
                created.content.as_str(),
                author.to_string(),
                encode_comments(&created.comments)?,
                created.created_at,
            ],
        )?;

        debug!(
            "event=post_create module=repo status=ok post_id={} author_id={}",
            created.id, author
        );
        Ok(created)
    }

    fn find_post_by_id(&self, id: PostId, populate: PopulateOptions) -> RepoResult<Option<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE p.id = ?1;", select_sql(populate)))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row, populate)?));
        }

        Ok(None)
    }

    fn update_post_by_id(&self, id: PostId, patch: &PostPatch) -> RepoResult<Option<Post>> {
        patch.validate()?;

        if !patch.is_empty() {
            let changed = self.conn.execute(
                "UPDATE posts
                 SET
                    title = COALESCE(?2, title),
                    content = COALESCE(?3, content),
                    author = COALESCE(?4, author)
                 WHERE id = ?1;",
                params![
                    id.to_string(),
                    patch.title.as_deref(),
                    patch.content.as_deref(),
                    patch.author.map(|author| author.to_string()),
                ],
            )?;

            if changed == 0 {
                return Ok(None);
            }
            debug!("event=post_update module=repo status=ok post_id={id}");
        }

        self.find_post_by_id(id, PopulateOptions::default())
    }

    fn delete_post_by_id(&self, id: PostId) -> RepoResult<Option<Post>> {
        let mut stmt = self.conn.prepare(
            "DELETE FROM posts
             WHERE id = ?1
             RETURNING id, title, content, author, comments, created_at;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let deleted = parse_post_row(row, PopulateOptions::default())?;
        debug!("event=post_delete module=repo status=ok post_id={id}");
        Ok(Some(deleted))
    }

    fn list_posts(&self, populate: PopulateOptions) -> RepoResult<Vec<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY p.rowid ASC;", select_sql(populate)))?;
        let mut rows = stmt.query([])?;
        let mut posts = Vec::new();

        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row, populate)?);
        }

        Ok(posts)
    }

    fn push_comment(&self, id: PostId, comment: &NewComment) -> RepoResult<Option<Post>> {
        let comment = comment.clone().into_comment()?;
        let encoded = serde_json::to_string(&comment)
            .map_err(|err| RepoError::InvalidData(format!("cannot encode comment: {err}")))?;

        let changed = self.conn.execute(
            "UPDATE posts
             SET comments = json_insert(comments, '$[#]', json(?2))
             WHERE id = ?1;",
            params![id.to_string(), encoded],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        self.find_post_by_id(id, PopulateOptions::default())
    }
}

fn select_sql(populate: PopulateOptions) -> String {
    if populate.resolve_author {
        format!(
            "SELECT {POST_FIELDS_SQL}, {AUTHOR_FIELDS_SQL}
             FROM posts p
             LEFT JOIN users u ON u.id = p.author"
        )
    } else {
        format!("SELECT {POST_FIELDS_SQL} FROM posts p")
    }
}

fn parse_post_row(row: &Row<'_>, populate: PopulateOptions) -> RepoResult<Post> {
    let id_text: String = row.get("id")?;
    let author_text: String = row.get("author")?;
    let author_id = parse_uuid(&author_text, "posts.author")?;

    let author = if populate.resolve_author {
        match row.get::<_, Option<String>>("author_user_id")? {
            Some(user_id) => PostAuthor::User(User {
                id: parse_uuid(&user_id, "users.id")?,
                name: row.get("author_name")?,
                email: row.get("author_email")?,
                avatar: row.get("author_avatar")?,
            }),
            None => PostAuthor::Missing,
        }
    } else {
        PostAuthor::Id(author_id)
    };

    let comments_json: String = row.get("comments")?;
    let comments: Vec<Comment> = serde_json::from_str(&comments_json).map_err(|err| {
        RepoError::InvalidData(format!("invalid comments array in posts.comments: {err}"))
    })?;

    Ok(Post {
        id: parse_uuid(&id_text, "posts.id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        author,
        comments,
        created_at: row.get("created_at")?,
    })
}

fn encode_comments(comments: &[Comment]) -> RepoResult<String> {
    serde_json::to_string(comments)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode comments: {err}")))
}
