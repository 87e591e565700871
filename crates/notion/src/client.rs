use std::time::Duration;

use async_trait::async_trait;
use shelf_kernel::settings::NotionSettings;

use crate::credentials::Credentials;
use crate::error::NotionError;
use crate::model::{Page, QueryRequest, QueryResponse};

/// Notion rejects larger page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A single query call against a database.
#[async_trait]
pub trait DatabaseQuery: Send + Sync {
    /// Fetch one page of results, continuing from `cursor` when given.
    async fn query_page(
        &self,
        credentials: &Credentials,
        cursor: Option<&str>,
    ) -> Result<QueryResponse, NotionError>;
}

/// Fetch every row of the database, following cursors until exhausted.
///
/// Rows keep the order Notion returned them in. Any failing call aborts the
/// whole fetch; rows from earlier pages are discarded.
pub async fn query_all(
    source: &dyn DatabaseQuery,
    credentials: &Credentials,
) -> Result<Vec<Page>, NotionError> {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;
    let mut calls = 0usize;

    loop {
        let response = source.query_page(credentials, cursor.as_deref()).await?;
        calls += 1;

        tracing::debug!(
            call = calls,
            results = response.results.len(),
            has_more = response.has_more,
            "received database query page"
        );

        pages.extend(response.results);

        match (response.has_more, response.next_cursor) {
            (true, Some(next)) => cursor = Some(next),
            (true, None) => {
                tracing::warn!(call = calls, "has_more without next_cursor; stopping");
                break;
            }
            (false, _) => break,
        }
    }

    tracing::info!(
        database_id = %credentials.database_id,
        calls,
        rows = pages.len(),
        "database query complete"
    );

    Ok(pages)
}

/// HTTP client for the Notion database query endpoint.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    page_size: u32,
}

impl NotionClient {
    pub fn new(settings: &NotionSettings) -> Result<Self, NotionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_version: settings.api_version.clone(),
            page_size: settings.page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn query_url(&self, database_id: &str) -> String {
        format!("{}/databases/{}/query", self.base_url, database_id)
    }
}

#[async_trait]
impl DatabaseQuery for NotionClient {
    async fn query_page(
        &self,
        credentials: &Credentials,
        cursor: Option<&str>,
    ) -> Result<QueryResponse, NotionError> {
        let body = QueryRequest {
            page_size: self.page_size,
            start_cursor: cursor,
        };

        let response = self
            .http
            .post(self.query_url(&credentials.database_id))
            .bearer_auth(&credentials.secret)
            .header("Notion-Version", &self.api_version)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(
                        status = status.as_u16(),
                        error = %err,
                        "failed to read Notion error body"
                    );
                    String::new()
                }
            };
            tracing::warn!(status = status.as_u16(), "Notion query rejected");
            return Err(NotionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
