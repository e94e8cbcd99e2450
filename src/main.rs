//! notion-completion-sync — back-fills completion dates in a Notion todo
//! database.
//!
//! Checks once that the database has the configured date and status
//! properties, then polls for records whose status is one of the "complete"
//! values but whose date is empty, and stamps each with its own
//! `last_edited_time`. Rate-limited queries are retried after a fixed delay.

#![warn(clippy::all)]

mod cli;
mod config;
mod notion;
pub mod retry;
mod schema;
mod shutdown;
mod sync;
mod types;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = config::Config::from_cli(cli)?;
    tracing::info!(
        database_id = %config.database_id,
        dry_run = config.dry_run,
        "Starting notion-completion-sync"
    );
    tracing::debug!(?config, "Loaded configuration");

    let client = notion::NotionClient::new(
        &config.api_base_url,
        &config.token,
        &config.notion_version,
        config.timeout,
    )?;

    let shutdown_token = shutdown::install_signal_handler()?;

    sync::run(&client, &config, shutdown_token).await
}
