//! Post document model with embedded comments.
//!
//! # Responsibility
//! - Define the stored post shape and its insert/patch inputs.
//! - Represent the author reference in both raw and populated form.
//!
//! # Invariants
//! - `title`, `content` and `author` are always present on a stored post.
//! - `comments` is never absent; an omitted list is stored as `[]`.
//! - Embedded comments keep insertion order.

use super::now_epoch_ms;
use super::user::{User, UserId};
use super::validation::{require, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PostId = Uuid;

const POST_RECORD: &str = "post";
const COMMENT_RECORD: &str = "comment";

/// Comment stored inline in its parent post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    pub author: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Insert input for an embedded comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewComment {
    pub content: String,
    pub author: Option<UserId>,
    /// Defaults to insertion time.
    pub created_at: Option<i64>,
}

impl NewComment {
    pub fn new(content: impl Into<String>, author: UserId) -> Self {
        Self {
            content: content.into(),
            author: Some(author),
            created_at: None,
        }
    }

    /// Validates and stamps the comment.
    pub fn into_comment(self) -> Result<Comment, ValidationError> {
        require_text(COMMENT_RECORD, "content", &self.content)?;
        let author = require(COMMENT_RECORD, "author", self.author)?;
        Ok(Comment {
            content: self.content,
            author,
            created_at: self.created_at.unwrap_or_else(now_epoch_ms),
        })
    }
}

/// Author slot of a post.
///
/// Serializes as the bare id, the embedded user document, or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PostAuthor {
    /// Unresolved reference.
    Id(UserId),
    /// Reference resolved into the full user document.
    User(User),
    /// Resolution was requested but no user has the referenced id.
    Missing,
}

impl PostAuthor {
    pub fn id(&self) -> Option<UserId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::User(user) => Some(user.id),
            Self::Missing => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Id(_) | Self::Missing => None,
        }
    }
}

/// Stored post document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: PostAuthor,
    pub comments: Vec<Comment>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Insert input for a post; the store assigns `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: Option<UserId>,
    pub comments: Vec<NewComment>,
    /// Defaults to insertion time.
    pub created_at: Option<i64>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>, author: UserId) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author: Some(author),
            comments: Vec::new(),
            created_at: None,
        }
    }

    /// Validates every field and returns the document to persist.
    pub fn into_post(self, id: PostId) -> Result<Post, ValidationError> {
        require_text(POST_RECORD, "title", &self.title)?;
        require_text(POST_RECORD, "content", &self.content)?;
        let author = require(POST_RECORD, "author", self.author)?;
        let comments = self
            .comments
            .into_iter()
            .map(NewComment::into_comment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Post {
            id,
            title: self.title,
            content: self.content,
            author: PostAuthor::Id(author),
            comments,
            created_at: self.created_at.unwrap_or_else(now_epoch_ms),
        })
    }
}

/// Partial field replacement. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<UserId>,
}

impl PostPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.author.is_none()
    }

    /// Replacement values must satisfy the same rules as inserts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text(POST_RECORD, "title", title)?;
        }
        if let Some(content) = &self.content {
            require_text(POST_RECORD, "content", content)?;
        }
        Ok(())
    }
}

/// Reference resolution switches for post reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateOptions {
    pub resolve_author: bool,
}

impl PopulateOptions {
    pub fn resolved() -> Self {
        Self {
            resolve_author: true,
        }
    }
}
