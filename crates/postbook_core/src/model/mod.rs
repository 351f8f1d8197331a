//! Document model for the users/posts collections.
//!
//! # Responsibility
//! - Define the stored record shapes and their insert/patch inputs.
//! - Validate required fields before anything reaches the store.
//!
//! # Invariants
//! - Ids are assigned by the store on insert and never reused.
//! - `Post::author` references a user by id; existence is not enforced.

pub mod post;
pub mod user;
pub mod validation;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
