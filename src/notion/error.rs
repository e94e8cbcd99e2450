use thiserror::Error;

/// Typed Notion API errors enabling retry classification.
///
/// `is_rate_limited()` separates the one transient condition the sync loop
/// waits out (HTTP 429) from everything else, which is fatal for a query.
#[derive(Debug, Error)]
pub enum NotionError {
    #[error(
        "Error finding database: {database_id}. \
         Are you sure you shared the database with the integration?"
    )]
    DatabaseNotFound { database_id: String },

    #[error("Rate limited by the Notion API ({endpoint})")]
    RateLimited { endpoint: String },

    #[error("Notion API error (HTTP {status}) from {endpoint}: {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl NotionError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, NotionError::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_classified() {
        let e = NotionError::RateLimited {
            endpoint: "databases/db1/query".into(),
        };
        assert!(e.is_rate_limited());
    }

    #[test]
    fn test_api_error_not_rate_limited() {
        let e = NotionError::Api {
            status: 500,
            endpoint: "databases/db1/query".into(),
            message: "internal".into(),
        };
        assert!(!e.is_rate_limited());
    }

    #[test]
    fn test_not_found_message_mentions_sharing() {
        let e = NotionError::DatabaseNotFound {
            database_id: "db1".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("db1"));
        assert!(msg.contains("shared the database with the integration"));
    }
}
