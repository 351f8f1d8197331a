//! Core data-access layer for postbook.
//! Users and posts with embedded comments, stored in SQLite.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{DbError, DbResult, Store, StoreLocation};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::post::{
    Comment, NewComment, NewPost, PopulateOptions, Post, PostAuthor, PostId, PostPatch,
};
pub use model::user::{NewUser, User, UserField, UserFilter, UserId, UserProjection};
pub use model::validation::ValidationError;
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::walkthrough::{
    AuthorSource, Walkthrough, WalkthroughError, WalkthroughReport, WalkthroughResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
