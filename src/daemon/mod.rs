//! Daemon module for the Pomodoro board.
//!
//! This module contains the long-running side of the application:
//! - `control`: Typed control surface over the timer
//! - `events`: Routing of timer events to alerts and session reports
//! - `ipc`: Unix socket server for CLI requests

pub mod control;
pub mod events;
pub mod ipc;

pub use control::{ControlError, ControlSurface};
pub use events::{Dashboard, DashboardState, EventDispatcher};
pub use ipc::{IpcError, IpcServer, RequestHandler};

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::api::{ApiClient, SessionStore, TaskStore};
use crate::config::AppConfig;
use crate::report::SessionReporter;
use crate::sound::{try_create_player, AlertTrigger, FailureLog, SoundPlayer};
use crate::timer::{TimerEngine, TimerRuntime, TokioScheduler};

/// Wires the timer, the event dispatcher and the reporter together.
///
/// Must be called from within a Tokio runtime. The spawned tasks live as
/// long as the returned surface (and its clones) do.
pub fn build_services(
    config: &AppConfig,
    sessions: Arc<dyn SessionStore>,
    tasks: Arc<dyn TaskStore>,
    alert: AlertTrigger,
) -> Result<ControlSurface> {
    let registry = config.build_registry().context("Invalid mode configuration")?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let engine = TimerEngine::new(
        registry,
        &config.default_mode,
        TokioScheduler::new(),
        event_tx,
    )?
    .with_auto_start_delay(config.auto_start_delay());
    let (timer, _timer_task) = TimerRuntime::spawn(engine);

    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let reporter = SessionReporter::new(sessions, tasks.clone(), outcome_tx);
    let dashboard = Dashboard::new();
    let flash = alert.subscribe();

    // Stats are shown before the first session completes.
    let initial = reporter.clone();
    tokio::spawn(async move { initial.refresh_stats().await });

    let dispatcher = EventDispatcher::new(alert, reporter, dashboard.clone());
    tokio::spawn(dispatcher.run(event_rx, outcome_rx));

    Ok(ControlSurface::new(timer, tasks, dashboard, flash))
}

/// Runs the daemon until Ctrl-C.
pub async fn run(config: AppConfig) -> Result<()> {
    let api = Arc::new(ApiClient::new(
        config.api_base_url.clone(),
        config.request_timeout(),
    ));
    info!("Using API at {}", api.base_url());

    let audio_log = FailureLog::default();
    let player = if config.sound {
        try_create_player(&audio_log).map(|p| p as Arc<dyn SoundPlayer>)
    } else {
        None
    };
    let alert = AlertTrigger::new(player).with_failure_log(audio_log);

    let surface = build_services(&config, api.clone(), api, alert)?;

    let socket_path = config
        .socket_path()
        .context("Could not determine the home directory for the socket path")?;
    let server = IpcServer::new(&socket_path)?;

    server
        .serve(RequestHandler::new(surface), shutdown_signal())
        .await?;

    info!("Daemon stopped");
    Ok(())
}

/// Completes on Ctrl-C.
///
/// If the handler cannot be installed the daemon keeps running and must be
/// stopped another way.
async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await;
}

async fn wait_for_signal<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Could not listen for Ctrl-C, the daemon will not stop on it: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test(start_paused = true)]
    async fn test_signal_completes_shutdown() {
        let result = timeout(Duration::from_secs(1), wait_for_signal(async { Ok(()) })).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_signal_handler_keeps_running() {
        let failing = async { Err(std::io::Error::other("no signal handler")) };
        let result = timeout(Duration::from_secs(3600), wait_for_signal(failing)).await;
        assert!(result.is_err());
    }
}
