//! REST client for the `tasks` resource.
//!
//! [`TaskApi`] is the seam the controller talks to; [`HttpTaskApi`] is the
//! reqwest-backed implementation. Each method issues exactly one request and
//! never retries.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::task::{NewTask, Status, Task, TaskId, TaskPatch};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};

#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `GET /tasks`
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// `GET /tasks/{id}`
    async fn get_task(&self, id: TaskId) -> Result<Task>;

    /// `POST /tasks`. New tasks always start in the to-do column.
    async fn create_task(&self, title: &str, description: Option<&str>) -> Result<Task>;

    /// `PUT /tasks/{id}` with only the fields set in `patch`.
    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task>;

    /// `DELETE /tasks/{id}`
    async fn delete_task(&self, id: TaskId) -> Result<()>;
}

pub struct HttpTaskApi {
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpTaskApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTaskApi")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpTaskApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            base_url: config.api_root().to_string(),
            client,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn item_url(&self, id: TaskId) -> String {
        format!("{}/tasks/{id}", self.base_url)
    }

    /// Sends the request and turns any non-success status into `RequestFailed`.
    async fn send(method: &'static str, url: String, request: RequestBuilder) -> Result<Response> {
        tracing::debug!(method, url = %url, "sending request");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::RequestFailed {
                method,
                url,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let url = self.collection_url();
        let response = Self::send("GET", url.clone(), self.client.get(&url)).await?;
        Ok(response.json().await?)
    }

    async fn get_task(&self, id: TaskId) -> Result<Task> {
        let url = self.item_url(id);
        let response = Self::send("GET", url.clone(), self.client.get(&url)).await?;
        Ok(response.json().await?)
    }

    async fn create_task(&self, title: &str, description: Option<&str>) -> Result<Task> {
        let url = self.collection_url();
        let body = NewTask {
            title: title.to_string(),
            description: description.map(str::to_string),
            status: Status::Todo,
        };
        let response = Self::send("POST", url.clone(), self.client.post(&url).json(&body)).await?;
        Ok(response.json().await?)
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        let url = self.item_url(id);
        let response = Self::send("PUT", url.clone(), self.client.put(&url).json(patch)).await?;
        Ok(response.json().await?)
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        let url = self.item_url(id);
        Self::send("DELETE", url.clone(), self.client.delete(&url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slash() {
        let config = ClientConfig {
            base_url: "http://localhost:8000/api/".into(),
            ..Default::default()
        };
        let api = HttpTaskApi::new(&config).unwrap();
        assert_eq!(api.collection_url(), "http://localhost:8000/api/tasks");
        assert_eq!(api.item_url(42), "http://localhost:8000/api/tasks/42");
    }

    #[test]
    fn debug_shows_base_url() {
        let api = HttpTaskApi::new(&ClientConfig::default()).unwrap();
        assert!(format!("{api:?}").contains("localhost:8000"));
    }
}
