use std::time::Duration;

use anyhow::bail;

/// Application configuration, built once from the CLI and shared by
/// reference for the lifetime of the process.
pub struct Config {
    pub database_id: String,
    pub token: String,
    pub complete_selects: Vec<String>,
    pub datetime_field: String,
    pub status_column: String,
    pub api_base_url: String,
    pub notion_version: String,

    pub backoff: Duration,
    pub poll_interval: Duration,
    pub timeout: Duration,

    pub max_rate_limit_retries: Option<u32>,

    pub dry_run: bool,
    pub once: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_id", &self.database_id)
            .field("token", &"<redacted>")
            .field("complete_selects", &self.complete_selects)
            .field("datetime_field", &self.datetime_field)
            .field("status_column", &self.status_column)
            .field("api_base_url", &self.api_base_url)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> anyhow::Result<Self> {
        let database_id = cli.database_id.trim().to_string();
        if database_id.is_empty() {
            bail!("--database-id must not be empty");
        }
        if cli.token.trim().is_empty() {
            bail!("--token must not be empty");
        }

        let complete_selects = normalize_selects(cli.complete_selects);
        if complete_selects.is_empty() {
            bail!("--complete-selects must name at least one status value");
        }

        let datetime_field = cli.datetime_field.trim().to_string();
        let status_column = cli.status_column.trim().to_string();
        if datetime_field.is_empty() || status_column.is_empty() {
            bail!("--datetime-field and --status-column must not be empty");
        }

        let api_base_url = cli.api_base_url.trim_end_matches('/').to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            bail!(
                "Cannot use '{}' as the API base URL. Expected an http:// or https:// URL",
                cli.api_base_url
            );
        }

        Ok(Self {
            database_id,
            token: cli.token,
            complete_selects,
            datetime_field,
            status_column,
            api_base_url,
            notion_version: cli.notion_version,
            backoff: Duration::from_secs(cli.sleep_for),
            poll_interval: Duration::from_millis(cli.poll_interval_ms),
            timeout: Duration::from_secs(cli.timeout_secs),
            max_rate_limit_retries: cli.max_rate_limit_retries,
            dry_run: cli.dry_run,
            once: cli.once,
        })
    }
}

/// Trim each status value, drop blanks, and drop repeats while keeping the
/// order the user gave them in.
fn normalize_selects(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for value in raw {
        let value = value.trim();
        if value.is_empty() || out.iter().any(|v| v == value) {
            continue;
        }
        out.push(value.to_string());
    }
    out
}
