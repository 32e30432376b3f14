//! Session and task API.
//!
//! This module provides:
//! - `SessionStore`: persistence collaborator for completed work phases
//! - `TaskStore`: read access to the external task list
//! - `ApiClient`: HTTP implementation of both, plus task list editing
//! - `MockStore`: in-memory implementation for testing

mod error;
mod mock;

pub use error::ApiError;
pub use mock::MockStore;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use tracing::debug;

use crate::types::{NewTask, SessionRecord, Stats, Task, TaskId};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Traits
// ============================================================================

/// Persists completed work sessions and serves aggregate statistics.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Records one completed work phase.
    async fn record_session(&self, record: &SessionRecord) -> Result<(), ApiError>;

    /// Fetches the aggregate statistics.
    async fn fetch_stats(&self) -> Result<Stats, ApiError>;
}

/// Read access to the external task list.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Lists all tasks.
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;

    /// Looks up the current name of a task. `Ok(None)` if it no longer exists.
    async fn get_task_name(&self, id: TaskId) -> Result<Option<String>, ApiError> {
        let tasks = self.list_tasks().await?;
        Ok(tasks.into_iter().find(|t| t.id == id).map(|t| t.name))
    }
}

// ============================================================================
// ApiClient
// ============================================================================

#[derive(Serialize)]
struct CompletedUpdate {
    completed: bool,
}

/// HTTP client for the session / task API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Creates a client for `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let endpoint = format!("{} {}", method, path);
        debug!("API request: {}", endpoint);

        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ApiError::Request {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        response.json().await.map_err(|source| ApiError::Request {
            endpoint: format!("GET {}", path),
            source,
        })
    }

    /// Creates a task.
    pub async fn add_task(&self, task: &NewTask) -> Result<(), ApiError> {
        self.send(Method::POST, "/api/todos", Some(task)).await?;
        Ok(())
    }

    /// Marks a task completed or not completed.
    pub async fn set_completed(&self, id: TaskId, completed: bool) -> Result<(), ApiError> {
        let path = format!("/api/todos/{}", id);
        self.send(Method::PATCH, &path, Some(&CompletedUpdate { completed }))
            .await?;
        Ok(())
    }

    /// Deletes a task.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        let path = format!("/api/todos/{}", id);
        self.send::<()>(Method::DELETE, &path, None).await?;
        Ok(())
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl SessionStore for ApiClient {
    async fn record_session(&self, record: &SessionRecord) -> Result<(), ApiError> {
        self.send(Method::POST, "/api/sessions", Some(record)).await?;
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<Stats, ApiError> {
        self.get_json("/api/stats").await
    }
}

#[async_trait]
impl TaskStore for ApiClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get_json("/api/todos").await
    }
}
