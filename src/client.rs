//! HTTP client for the ClickUp v2 REST API.
//!
//! One authenticated GET per call, query parameters encoded by `reqwest`;
//! absent parameters are omitted entirely rather than serialized as a
//! placeholder string. Transport failures and rejected responses map to
//! distinct error variants because only transport failures may trigger the
//! snapshot fallback upstream in the pipeline. No retries happen here.

use std::time::Duration;

use serde::Deserialize;

use crate::api::UpstreamApi;
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::types::{FolderListing, ListListing, RawActivity, RawComment, RawTask};

/// Page size the upstream uses for task listings; a shorter page means the
/// listing is exhausted.
const UPSTREAM_PAGE_SIZE: usize = 100;

/// Authenticated client for the upstream API.
#[derive(Debug, Clone)]
pub struct ClickUpClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ClickUpClient {
    /// Build a client with the timeout and base URL from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Connect`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(credential: &str, config: &ReportConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ReportError::Connect(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: credential.to_string(),
        })
    }

    /// Issue one authenticated GET against the upstream.
    ///
    /// `query` holds only the parameters that are actually present.
    ///
    /// # Errors
    ///
    /// [`ReportError::Connect`] when the transport fails,
    /// [`ReportError::UpstreamStatus`] for a non-2xx response, and
    /// [`ReportError::Decode`] when the body is not JSON.
    pub async fn call(&self, path: &str, query: &[(&str, String)]) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::trace!(%url, params = query.len(), "upstream GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|e| ReportError::Connect(format!("GET {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%path, status = status.as_u16(), "upstream rejected request");
            return Err(ReportError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ReportError::Decode(format!("GET {path}: {e}")))
    }

    fn decode<T: for<'de> Deserialize<'de>>(path: &str, body: serde_json::Value) -> Result<T> {
        serde_json::from_value(body).map_err(|e| ReportError::Decode(format!("GET {path}: {e}")))
    }
}

// Envelope shapes the upstream wraps its collections in. A missing key
// reads as an empty collection.
#[derive(Deserialize)]
struct FoldersEnvelope {
    #[serde(default)]
    folders: Vec<FolderListing>,
}

#[derive(Deserialize)]
struct ListsEnvelope {
    #[serde(default)]
    lists: Vec<ListListing>,
}

#[derive(Deserialize)]
struct TasksEnvelope {
    #[serde(default)]
    tasks: Vec<RawTask>,
}

#[derive(Deserialize)]
struct CommentsEnvelope {
    #[serde(default)]
    comments: Vec<RawComment>,
}

#[derive(Deserialize)]
struct HistoryEnvelope {
    #[serde(default)]
    history: Vec<RawActivity>,
}

impl UpstreamApi for ClickUpClient {
    async fn fetch_folders(&self, scope_id: &str) -> Result<Vec<FolderListing>> {
        let path = format!("/space/{scope_id}/folder");
        let body = self.call(&path, &[]).await?;
        let envelope: FoldersEnvelope = Self::decode(&path, body)?;
        Ok(envelope.folders)
    }

    async fn fetch_lists(&self, scope_id: &str) -> Result<Vec<ListListing>> {
        let path = format!("/space/{scope_id}/list");
        let body = self.call(&path, &[]).await?;
        let envelope: ListsEnvelope = Self::decode(&path, body)?;
        Ok(envelope.lists)
    }

    async fn fetch_tasks(
        &self,
        list_id: &str,
        updated_after_ms: Option<i64>,
        include_closed: bool,
    ) -> Result<Vec<RawTask>> {
        let path = format!("/list/{list_id}/task");
        let mut tasks = Vec::new();
        let mut page: u32 = 0;

        loop {
            let mut query: Vec<(&str, String)> = vec![("page", page.to_string())];
            if include_closed {
                query.push(("include_closed", "true".to_string()));
            }
            if let Some(cutoff) = updated_after_ms {
                query.push(("date_updated_gt", cutoff.to_string()));
            }

            let body = self.call(&path, &query).await?;
            let envelope: TasksEnvelope = Self::decode(&path, body)?;
            let count = envelope.tasks.len();
            tasks.extend(envelope.tasks);

            if count < UPSTREAM_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        tracing::debug!(list_id, total = tasks.len(), pages = page + 1, "tasks fetched");
        Ok(tasks)
    }

    async fn fetch_comments(&self, task_id: &str) -> Result<Vec<RawComment>> {
        let path = format!("/task/{task_id}/comment");
        let body = self.call(&path, &[]).await?;
        let envelope: CommentsEnvelope = Self::decode(&path, body)?;
        Ok(envelope.comments)
    }

    async fn fetch_history(&self, task_id: &str) -> Result<Vec<RawActivity>> {
        let path = format!("/task/{task_id}/history");
        let body = self.call(&path, &[]).await?;
        let envelope: HistoryEnvelope = Self::decode(&path, body)?;
        Ok(envelope.history)
    }
}
