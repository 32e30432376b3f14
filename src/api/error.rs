//! Error types for the session and task API.

use thiserror::Error;

/// Errors raised while talking to the session / task API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the body could not be decoded.
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The requested task does not exist.
    #[error("task {0} not found")]
    TaskNotFound(u64),

    /// Failure injected by a mock store.
    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    /// Returns true if the failure may go away on its own
    /// (connection problems, timeouts, server errors).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request { source, .. } => source.is_connect() || source.is_timeout(),
            Self::Status { status, .. } => *status >= 500,
            Self::TaskNotFound(_) => false,
            Self::Unavailable(_) => true,
        }
    }

    /// Returns a short hint for the user.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Request { .. } | Self::Unavailable(_) => {
                "Check that the API server is running and api_base_url is correct"
            }
            Self::Status { .. } => "Check the API server logs",
            Self::TaskNotFound(_) => "Run `pomodoro-board tasks` to list task ids",
        }
    }
}
