//! IPC Server for the Pomodoro board daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - One JSON request and one JSON response per connection
//! - Dispatch of requests to the control surface

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use crate::types::{IpcRequest, IpcResponse, ResponseData};

use super::control::{ControlError, ControlSurface};

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// The client closed the connection without sending a request
    #[error("Connection closed by client")]
    ConnectionClosed,

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        // Remove a stale socket left by a previous daemon
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Reads until the client shuts down its write side, with a timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = Vec::with_capacity(256);
        let mut limited = (&mut *stream).take(MAX_REQUEST_SIZE as u64 + 1);

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            limited.read_to_end(&mut buffer),
        )
        .await;

        match read_result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        }

        if buffer.is_empty() {
            return Err(IpcError::ConnectionClosed.into());
        }
        if buffer.len() > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest =
            serde_json::from_slice(&buffer).context("Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Serves connections until `shutdown` completes.
    ///
    /// Each connection is handled on its own task.
    pub async fn serve<F>(&self, handler: RequestHandler, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Listening on {:?}", self.socket_path);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                accepted = self.accept() => {
                    let mut stream = match accepted {
                        Ok(stream) => stream,
                        Err(e) => {
                            warn!("{:#}", e);
                            continue;
                        }
                    };
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(&mut stream, &handler).await {
                            debug!("Connection error: {:#}", e);
                        }
                    });
                }
            }
        }
        Ok(())
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Handles one request / response exchange.
async fn handle_connection(stream: &mut UnixStream, handler: &RequestHandler) -> Result<()> {
    let response = match IpcServer::receive_request(stream).await {
        Ok(request) => {
            debug!(?request, "IPC request");
            handler.handle(request).await
        }
        Err(e) => IpcResponse::error(format!("Invalid request: {:#}", e), None),
    };
    IpcServer::send_response(stream, &response).await
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the control surface.
#[derive(Clone)]
pub struct RequestHandler {
    surface: ControlSurface,
}

impl RequestHandler {
    pub fn new(surface: ControlSurface) -> Self {
        Self { surface }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        let surface = &self.surface;
        match request {
            IpcRequest::Start => self.respond(surface.start().await, |_| "Timer started".into()).await,
            IpcRequest::Pause => self.respond(surface.pause().await, |_| "Timer paused".into()).await,
            IpcRequest::Reset => self.respond(surface.reset().await, |_| "Timer reset".into()).await,
            IpcRequest::SelectMode { mode } => {
                self.respond(surface.select_mode(&mode).await, |data| {
                    format!("Mode set to {}", data.mode)
                })
                .await
            }
            IpcRequest::SelectTask { id } => {
                self.respond(surface.select_task(id).await, |data| {
                    format!("Working on: {}", data.task_name.as_deref().unwrap_or_default())
                })
                .await
            }
            IpcRequest::ClearTask => {
                self.respond(surface.clear_task().await, |_| "Task cleared".into())
                    .await
            }
            IpcRequest::TaskDeleted { id } => {
                self.respond(surface.task_deleted(id).await, |_| String::new())
                    .await
            }
            IpcRequest::Status => self.respond(surface.status().await, |_| String::new()).await,
        }
    }

    /// Builds the response; rejections carry the unchanged status.
    async fn respond(
        &self,
        result: Result<ResponseData, ControlError>,
        message: impl FnOnce(&ResponseData) -> String,
    ) -> IpcResponse {
        match result {
            Ok(data) => IpcResponse::success(message(&data), Some(data)),
            Err(e) => {
                debug!("Request rejected: {}", e);
                let data = if e.is_rejection() {
                    self.surface.status().await.ok()
                } else {
                    None
                };
                IpcResponse::error(e.to_string(), data)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
