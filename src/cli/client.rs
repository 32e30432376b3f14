//! IPC Client for communicating with the Pomodoro board daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic (connect only)
//! - Timeout handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::config::AppConfig;
use crate::types::{IpcRequest, IpcResponse, TaskId};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
#[derive(Debug, Clone)]
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
    /// Attempts per request
    retries: u32,
}

impl IpcClient {
    /// Creates a client for the socket configured in `config`.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let socket_path = config
            .socket_path()
            .context("Could not determine the home directory for the socket path")?;
        Ok(Self::with_socket_path(socket_path))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
            retries: MAX_RETRIES,
        }
    }

    /// Makes a single attempt per request.
    pub fn without_retry(mut self) -> Self {
        self.retries = 1;
        self
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends a start command to the daemon.
    pub async fn start(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Start).await
    }

    /// Sends a pause command to the daemon.
    pub async fn pause(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Pause).await
    }

    /// Sends a reset command to the daemon.
    pub async fn reset(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Reset).await
    }

    /// Selects a mode by name.
    pub async fn select_mode(&self, mode: &str) -> Result<IpcResponse> {
        self.request(&IpcRequest::SelectMode {
            mode: mode.to_string(),
        })
        .await
    }

    /// Attaches a task to the timer.
    pub async fn select_task(&self, id: TaskId) -> Result<IpcResponse> {
        self.request(&IpcRequest::SelectTask { id }).await
    }

    /// Detaches the current task.
    pub async fn clear_task(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::ClearTask).await
    }

    /// Tells the daemon a task was deleted.
    pub async fn task_deleted(&self, id: TaskId) -> Result<IpcResponse> {
        self.request(&IpcRequest::TaskDeleted { id }).await
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Status).await
    }

    /// Sends a request and turns error responses into errors.
    ///
    /// Error responses are final: they are not retried.
    async fn request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let response = self.send_request(request).await?;
        if response.is_error() {
            anyhow::bail!("{}", response.message);
        }
        Ok(response)
    }

    /// Connects to the daemon, retrying failed connection attempts.
    ///
    /// Only connecting is retried. Once a request is written the daemon
    /// may have applied it, so a lost response is never resent.
    async fn connect_with_retry(&self) -> Result<UnixStream> {
        let mut attempt = 1;
        loop {
            match self.connect().await {
                Ok(stream) => return Ok(stream),
                Err(e) if attempt < self.retries => {
                    tracing::debug!("Connect failed (attempt {}/{}): {:#}", attempt, self.retries, e);
                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn connect(&self) -> Result<UnixStream> {
        timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timed out")?
            .context("Could not connect to the daemon. Start it with 'pomodoro-board daemon'")
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let io_timeout = Duration::from_secs(IO_TIMEOUT_SECS);

        let mut stream = self.connect_with_retry().await?;

        let request_json =
            serde_json::to_vec(request).context("Failed to serialize request")?;

        timeout(io_timeout, stream.write_all(&request_json))
            .await
            .context("Write timed out")?
            .context("Failed to send request")?;

        timeout(io_timeout, stream.flush())
            .await
            .context("Flush timed out")?
            .context("Failed to flush request")?;

        // Shutdown write side to signal end of request
        stream.shutdown().await.context("Failed to shut down write side")?;

        let mut buffer = Vec::new();
        let mut limited = stream.take(MAX_RESPONSE_SIZE as u64);
        timeout(io_timeout, limited.read_to_end(&mut buffer))
            .await
            .context("Read timed out")?
            .context("Failed to receive response")?;

        if buffer.is_empty() {
            anyhow::bail!("No response from the daemon");
        }

        let response: IpcResponse =
            serde_json::from_slice(&buffer).context("Failed to parse response")?;

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================
