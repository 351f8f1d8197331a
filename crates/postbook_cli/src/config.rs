//! Command-line and environment configuration.

use clap::Parser;
use postbook_core::AuthorSource;
use uuid::Uuid;

pub const DEFAULT_DATABASE: &str = "sqlite://test.db";

#[derive(Parser, Debug)]
#[command(
    name = "postbook",
    version,
    about = "Walk through create/read/update/delete and populate on a users/posts store"
)]
pub struct Cli {
    /// Store location: sqlite://<path>, sqlite::memory: or a file path
    #[arg(long, env = "POSTBOOK_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Author id for the sample post instead of the freshly created user
    #[arg(long, env = "POSTBOOK_AUTHOR_ID", conflicts_with = "prompt_author")]
    pub author_id: Option<Uuid>,

    /// Ask for the author id on the console
    #[arg(long)]
    pub prompt_author: bool,

    /// trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, env = "POSTBOOK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when unset
    #[arg(long, env = "POSTBOOK_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl Cli {
    pub fn author_source(&self) -> AuthorSource {
        if self.prompt_author {
            return AuthorSource::Prompt;
        }
        match self.author_id {
            Some(id) => AuthorSource::Explicit(id),
            None => AuthorSource::CreatedUser,
        }
    }

    pub fn log_level(&self) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| postbook_core::default_log_level().to_string())
    }
}
