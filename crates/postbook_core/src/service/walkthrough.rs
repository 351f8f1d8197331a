//! Users/posts walkthrough.
//!
//! # Responsibility
//! - Run the fixed create/read/update/delete/populate sequence against the
//!   repositories and print every intermediate result.
//! - Decide the post author from an explicit `AuthorSource`.
//!
//! # Invariants
//! - Steps run strictly in order; the first error aborts the sequence.
//! - No step retries or rolls back.
//! - Every printed result is `<label> <pretty JSON>` on `output`.

use crate::model::post::{NewPost, PopulateOptions, Post, PostPatch};
use crate::model::user::{NewUser, User, UserField, UserFilter, UserId};
use crate::repo::post_repo::PostRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};

pub const SAMPLE_USER_NAME: &str = "Bill";
pub const SAMPLE_USER_EMAIL: &str = "bill@initech.com";
pub const SAMPLE_USER_AVATAR: &str = "https://i.imgur.com/dM7Thhn.png";
pub const SAMPLE_POST_TITLE: &str = "Primer Post";
pub const SAMPLE_POST_CONTENT: &str = "Este es el contenido del primer post";
pub const UPDATED_POST_TITLE: &str = "Post Actualizado";

const AUTHOR_PROMPT: &str = "Enter author id: ";

/// Where the new post's author id comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorSource {
    /// Use the id of the user created earlier in the walkthrough.
    #[default]
    CreatedUser,
    /// Use a configured id.
    Explicit(UserId),
    /// Ask on the console.
    Prompt,
}

pub type WalkthroughResult<T> = Result<T, WalkthroughError>;

#[derive(Debug)]
pub enum WalkthroughError {
    Repo(RepoError),
    /// Console read/write failure.
    Io(io::Error),
    /// A result could not be rendered as JSON.
    Output(serde_json::Error),
    /// Typed author id is not a valid identifier.
    InvalidAuthorId(String),
}

impl Display for WalkthroughError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "console i/o failed: {err}"),
            Self::Output(err) => write!(f, "cannot render result: {err}"),
            Self::InvalidAuthorId(value) => write!(f, "invalid author id: `{value}`"),
        }
    }
}

impl Error for WalkthroughError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Output(err) => Some(err),
            Self::InvalidAuthorId(_) => None,
        }
    }
}

impl From<RepoError> for WalkthroughError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<io::Error> for WalkthroughError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for WalkthroughError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

/// Records produced along the way, for callers that want more than stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkthroughReport {
    pub user: User,
    pub post: Post,
    pub updated_post: Option<Post>,
    pub deleted_post: Option<Post>,
    pub remaining_posts: Vec<Post>,
}

/// Drives the walkthrough over injected repositories.
pub struct Walkthrough<U: UserRepository, P: PostRepository> {
    users: U,
    posts: P,
}

impl<U: UserRepository, P: PostRepository> Walkthrough<U, P> {
    pub fn new(users: U, posts: P) -> Self {
        Self { users, posts }
    }

    /// Runs every step in order.
    ///
    /// `input` is only read when `author_source` is `AuthorSource::Prompt`.
    pub fn run<R: BufRead, W: Write>(
        &self,
        author_source: AuthorSource,
        input: &mut R,
        output: &mut W,
    ) -> WalkthroughResult<WalkthroughReport> {
        let new_user =
            NewUser::new(SAMPLE_USER_NAME, SAMPLE_USER_EMAIL).with_avatar(SAMPLE_USER_AVATAR);
        emit(output, "new_user", &new_user)?;

        let user = self.users.create_user(&new_user)?;
        emit(output, "created_user", &user)?;

        let by_id = self.users.find_user_by_id(user.id)?;
        emit(output, "user_by_id", &by_id)?;

        let filter = UserFilter::default().name(SAMPLE_USER_NAME);
        let by_filter = self.users.find_user(&filter)?;
        emit(output, "user_by_filter", &by_filter)?;

        let projected = self
            .users
            .find_user_projected(&filter, &[UserField::Name, UserField::Email])?;
        emit(output, "user_projection", &projected)?;

        let author_id = resolve_author_id(author_source, &user, input, output)?;
        info!(
            "event=walkthrough_author module=service status=ok source={} author_id={author_id}",
            source_name(author_source)
        );

        let post = self.posts.create_post(&NewPost::new(
            SAMPLE_POST_TITLE,
            SAMPLE_POST_CONTENT,
            author_id,
        ))?;
        emit(output, "created_post", &post)?;

        let populated = self
            .posts
            .find_post_by_id(post.id, PopulateOptions::resolved())?;
        emit(output, "populated_post", &populated)?;

        let updated_post = self
            .posts
            .update_post_by_id(post.id, &PostPatch::title(UPDATED_POST_TITLE))?;
        emit(output, "updated_post", &updated_post)?;

        let deleted_post = self.posts.delete_post_by_id(post.id)?;
        emit(output, "deleted_post", &deleted_post)?;

        let remaining_posts = self.posts.list_posts(PopulateOptions::resolved())?;
        emit(output, "all_posts", &remaining_posts)?;

        Ok(WalkthroughReport {
            user,
            post,
            updated_post,
            deleted_post,
            remaining_posts,
        })
    }
}

/// Picks the author id for the sample post.
pub fn resolve_author_id<R: BufRead, W: Write>(
    source: AuthorSource,
    created: &User,
    input: &mut R,
    output: &mut W,
) -> WalkthroughResult<UserId> {
    match source {
        AuthorSource::CreatedUser => Ok(created.id),
        AuthorSource::Explicit(id) => Ok(id),
        AuthorSource::Prompt => prompt_author_id(input, output),
    }
}

fn prompt_author_id<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> WalkthroughResult<UserId> {
    write!(output, "{AUTHOR_PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let typed = line.trim();
    UserId::parse_str(typed).map_err(|_| WalkthroughError::InvalidAuthorId(typed.to_string()))
}

fn emit<W: Write, T: Serialize + ?Sized>(
    output: &mut W,
    label: &'static str,
    value: &T,
) -> WalkthroughResult<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    writeln!(output, "{label} {rendered}")?;
    info!("event=walkthrough_step module=service status=ok step={label}");
    Ok(())
}

fn source_name(source: AuthorSource) -> &'static str {
    match source {
        AuthorSource::CreatedUser => "created_user",
        AuthorSource::Explicit(_) => "explicit",
        AuthorSource::Prompt => "prompt",
    }
}
