//! `postbook` entry point.
//!
//! # Responsibility
//! - Parse configuration, start logging and open the store.
//! - Run the walkthrough and release the store on every exit path.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::Cli;
use log::{error, info};
use postbook_core::{
    init_logging, AuthorSource, SqlitePostRepository, SqliteUserRepository, Store, StoreLocation,
    Walkthrough,
};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level(), cli.log_dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    let location: StoreLocation = cli
        .database
        .parse()
        .with_context(|| format!("invalid database location `{}`", cli.database))?;
    let store = Store::open(&location)
        .with_context(|| format!("failed to connect to `{location}`"))?;
    info!("event=store_ready module=cli status=ok location={location}");

    // Close before surfacing a walkthrough error so release happens either way.
    let outcome = run(&store, cli.author_source());
    let closed = store.close().context("failed to close store");

    if let Err(err) = &outcome {
        error!("event=walkthrough module=cli status=error error={err:#}");
    }
    outcome?;
    closed
}

fn run(store: &Store, author_source: AuthorSource) -> Result<()> {
    let users = SqliteUserRepository::try_new(store.connection())
        .context("users collection is not ready")?;
    let posts = SqlitePostRepository::try_new(store.connection())
        .context("posts collection is not ready")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let report = Walkthrough::new(users, posts)
        .run(author_source, &mut stdin.lock(), &mut stdout.lock())
        .context("walkthrough aborted")?;

    info!(
        "event=walkthrough module=cli status=ok user_id={} post_id={} remaining_posts={}",
        report.user.id,
        report.post.id,
        report.remaining_posts.len()
    );
    Ok(())
}
