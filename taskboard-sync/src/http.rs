use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use std::time::Duration;
use taskboard_core::Task;
use tracing::{debug, warn};

use crate::api::{parse_error_body, ApiError, TaskApi};
use crate::dto::RemoteTask;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// `reqwest` client for a REST `/tasks` resource.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    base: Url,
}

impl HttpTaskApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base_url).map_err(|e| ApiError::Config(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Config(format!("{base_url}: not a base url")));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL plus path segments; segments are percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // checked in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn send(req: reqwest::RequestBuilder, what: &str) -> Result<Response, ApiError> {
    let resp = req
        .send()
        .await
        .map_err(|e| ApiError::Transport(format!("{what}: {e}")))?;

    let status = resp.status();
    debug!(%status, "{what}");
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    Err(ApiError::Rejected {
        status: status.as_u16(),
        body: parse_error_body(&text),
    })
}

impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> Result<Vec<RemoteTask>, ApiError> {
        let resp = send(self.client.get(self.url(&["tasks"])), "GET /tasks").await?;
        resp.json::<Vec<RemoteTask>>()
            .await
            .map_err(|e| ApiError::Decode(format!("task list: {e}")))
    }

    async fn create_task(&self, task: &Task) -> Result<Option<RemoteTask>, ApiError> {
        let resp = send(self.client.post(self.url(&["tasks"])).json(task), "POST /tasks").await?;
        // the server already accepted the task; a broken or undecodable echo
        // only means the client id stays authoritative
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "POST /tasks: unreadable success body, keeping client id");
                return Ok(None);
            }
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str(&text).ok())
    }

    async fn update_task(&self, task: &Task) -> Result<(), ApiError> {
        let req = self.client.put(self.url(&["tasks", task.id.as_str()])).json(task);
        send(req, "PUT /tasks/:id").await?;
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        send(self.client.delete(self.url(&["tasks", id])), "DELETE /tasks/:id").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_resource_urls() {
        let api = HttpTaskApi::new("http://localhost:3001").unwrap();
        assert_eq!(api.url(&["tasks"]).as_str(), "http://localhost:3001/tasks");
        assert_eq!(api.url(&["tasks", "a b/c"]).as_str(), "http://localhost:3001/tasks/a%20b%2Fc");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let api = HttpTaskApi::new("http://example.com/api/").unwrap();
        assert_eq!(api.url(&["tasks", "1"]).as_str(), "http://example.com/api/tasks/1");
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(matches!(HttpTaskApi::new("not a url"), Err(ApiError::Config(_))));
        assert!(matches!(HttpTaskApi::new("mailto:me@example.com"), Err(ApiError::Config(_))));
    }
}
