use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use super::error::NotionError;
use super::types::{DatabaseSchema, QueryResponse};

/// Header carrying the API version every request is pinned to.
const NOTION_VERSION_HEADER: &str = "notion-version";

/// The three Notion endpoints the sync loop talks to.
///
/// The concrete implementation is [`NotionClient`]; tests drive the loop
/// through fakes of this trait.
#[async_trait::async_trait]
pub trait NotionApi: Send + Sync {
    async fn get_database(&self, database_id: &str) -> Result<DatabaseSchema, NotionError>;

    async fn query_database(
        &self,
        database_id: &str,
        body: &Value,
    ) -> Result<QueryResponse, NotionError>;

    async fn update_page(&self, page_id: &str, body: &Value) -> Result<(), NotionError>;
}

/// Authenticated reqwest client for the Notion REST API.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    base_url: String,
}

impl NotionClient {
    /// Build a client that sends the bearer token and version header on
    /// every request.
    pub fn new(
        base_url: &str,
        token: &str,
        notion_version: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let bearer = format!("Bearer {}", token);
        let mut auth = HeaderValue::from_str(&bearer)
            .context("API token contains characters not allowed in a header")?;
        auth.set_sensitive(true);
        let version = HeaderValue::from_str(notion_version)
            .with_context(|| format!("Invalid Notion-Version '{}'", notion_version))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(HeaderName::from_static(NOTION_VERSION_HEADER), version);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }
}

/// Map a non-success response to a typed error, keeping Notion's own
/// message when the body carries one.
async fn error_for_status(endpoint: &str, resp: Response) -> NotionError {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return NotionError::RateLimited {
            endpoint: endpoint.to_string(),
        };
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .unwrap_or(text);
    NotionError::Api {
        status: status.as_u16(),
        endpoint: endpoint.to_string(),
        message,
    }
}

#[async_trait::async_trait]
impl NotionApi for NotionClient {
    async fn get_database(&self, database_id: &str) -> Result<DatabaseSchema, NotionError> {
        let endpoint = format!("databases/{}", database_id);
        tracing::debug!("GET {}", endpoint);
        let resp = self.client.get(self.url(&endpoint)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(NotionError::DatabaseNotFound {
                database_id: database_id.to_string(),
            });
        }
        if !resp.status().is_success() {
            return Err(error_for_status(&endpoint, resp).await);
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn query_database(
        &self,
        database_id: &str,
        body: &Value,
    ) -> Result<QueryResponse, NotionError> {
        let endpoint = format!("databases/{}/query", database_id);
        tracing::debug!("POST {} body: {}", endpoint, body);
        let resp = self
            .client
            .post(self.url(&endpoint))
            .json(body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_for_status(&endpoint, resp).await);
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn update_page(&self, page_id: &str, body: &Value) -> Result<(), NotionError> {
        let endpoint = format!("pages/{}", page_id);
        let resp = self
            .client
            .patch(self.url(&endpoint))
            .json(body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_for_status(&endpoint, resp).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> NotionClient {
        NotionClient::new(
            &server.uri(),
            "secret_abc",
            "2021-05-13",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_database_sends_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/databases/db1"))
            .and(header("authorization", "Bearer secret_abc"))
            .and(header("notion-version", "2021-05-13"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "database",
                "properties": {"Completed On": {"type": "date", "date": {}}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let schema = client(&server).get_database("db1").await.unwrap();
        assert_eq!(schema.properties["Completed On"].kind, "date");
    }

    #[tokio::test]
    async fn test_get_database_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/databases/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "object": "error",
                "status": 404,
                "code": "object_not_found",
                "message": "Could not find database"
            })))
            .mount(&server)
            .await;

        let err = client(&server).get_database("missing").await.unwrap_err();
        match err {
            NotionError::DatabaseNotFound { database_id } => assert_eq!(database_id, "missing"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_query_429_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db1/query"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let api = client(&server);
        let body = json!({"filter": {}});
        let err = api.query_database("db1", &body).await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_query_error_keeps_notion_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db1/query"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "object": "error",
                "status": 400,
                "code": "validation_error",
                "message": "Could not find property with name or id: Completed On"
            })))
            .mount(&server)
            .await;

        let api = client(&server);
        let body = json!({"filter": {}});
        let err = api.query_database("db1", &body).await.unwrap_err();
        match err {
            NotionError::Api { status, message, .. } => {
                assert_eq!(status, 400);
                assert!(message.contains("Completed On"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_update_page_sends_patch_body() {
        let server = MockServer::start().await;
        let body = json!({
            "properties": {
                "Completed On": {"date": {"start": "2024-01-01T00:00:00.000Z"}}
            }
        });
        let updated = json!({"object": "page", "id": "p1"});
        Mock::given(method("PATCH"))
            .and(path("/v1/pages/p1"))
            .and(body_json(&body))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).update_page("p1", &body).await.unwrap();
    }

    #[test]
    fn test_new_rejects_token_with_newline() {
        let result = NotionClient::new(
            "http://localhost",
            "bad\ntoken",
            "2021-05-13",
            Duration::from_secs(1),
        );
        assert!(result.is_err());
    }
}
