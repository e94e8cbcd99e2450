use clap::Parser;

use crate::types::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "notion-completion-sync",
    about = "Back-fill completion dates on finished Notion database records"
)]
pub struct Cli {
    /// The id of the todo database
    #[arg(long, env = "NOTION_DATABASE_ID")]
    pub database_id: String,

    /// The API token of the Notion integration.
    /// WARNING: passing via --token is visible in process listings.
    /// Prefer the NOTION_TOKEN environment variable instead.
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Status values that mark a record as completed (comma-separated)
    #[arg(
        long,
        env = "NOTION_COMPLETE_SELECTS",
        value_delimiter = ',',
        default_value = "Completed,Archived"
    )]
    pub complete_selects: Vec<String>,

    /// Date property to fill with the completion time
    #[arg(long, default_value = "Completed On")]
    pub datetime_field: String,

    /// Select property holding the completion status
    #[arg(long, default_value = "Status")]
    pub status_column: String,

    /// Seconds to wait before retrying a rate-limited request
    #[arg(long, default_value_t = 1)]
    pub sleep_for: u64,

    /// Milliseconds to wait between polling passes
    #[arg(long, default_value_t = 200)]
    pub poll_interval_ms: u64,

    /// Give up on a request after this many consecutive rate-limit responses
    /// (default: retry forever)
    #[arg(long)]
    pub max_rate_limit_retries: Option<u32>,

    /// Base URL of the Notion API
    #[arg(
        long,
        env = "NOTION_API_BASE_URL",
        default_value = "https://api.notion.com"
    )]
    pub api_base_url: String,

    /// Value sent in the Notion-Version header
    #[arg(long, default_value = "2021-05-13")]
    pub notion_version: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log the patches that would be sent without modifying Notion
    #[arg(long)]
    pub dry_run: bool,

    /// Run a single polling pass and exit
    #[arg(long)]
    pub once: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Cli {
        let mut args = vec![
            "notion-completion-sync",
            "--database-id",
            "db1",
            "--token",
            "secret",
        ];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.complete_selects, vec!["Completed", "Archived"]);
        assert_eq!(cli.datetime_field, "Completed On");
        assert_eq!(cli.status_column, "Status");
        assert_eq!(cli.sleep_for, 1);
        assert_eq!(cli.poll_interval_ms, 200);
        assert_eq!(cli.max_rate_limit_retries, None);
        assert_eq!(cli.notion_version, "2021-05-13");
        assert_eq!(cli.log_level, LogLevel::Info);
        assert!(!cli.dry_run);
        assert!(!cli.once);
    }

    #[test]
    fn test_complete_selects_comma_separated() {
        let cli = parse(&["--complete-selects", "Done,Won't Do,Shipped"]);
        assert_eq!(cli.complete_selects, vec!["Done", "Won't Do", "Shipped"]);
    }

    #[test]
    fn test_missing_database_id_rejected() {
        let result = Cli::try_parse_from(["notion-completion-sync", "--token", "secret"]);
        // NOTION_DATABASE_ID may be set in the environment running the tests
        if std::env::var_os("NOTION_DATABASE_ID").is_none() {
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_log_level_value_enum() {
        let cli = parse(&["--log-level", "warn"]);
        assert_eq!(cli.log_level, LogLevel::Warn);
    }
}
