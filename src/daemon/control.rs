//! Control surface.
//!
//! Typed front for the timer used by the IPC handler. Every operation
//! returns the status view the render target draws: the timer state,
//! its projection, the control affordances and the dashboard.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::api::{ApiError, TaskStore};
use crate::presentation::{project, title_text};
use crate::timer::{RuntimeError, TimerError, TimerHandle};
use crate::types::{Affordances, ResponseData, SelectedTask, TaskId, TimerSnapshot};

use super::events::Dashboard;

/// Errors surfaced to the client. None of them stop the timer.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The timer rejected the operation; state is unchanged.
    #[error("{0}")]
    Rejected(#[from] TimerError),

    /// The requested task is not in the task list.
    #[error("task {0} not found")]
    UnknownTask(TaskId),

    /// The task list could not be read.
    #[error("could not look up task: {0}")]
    TaskLookup(#[from] ApiError),

    /// The timer task has stopped.
    #[error("timer is not available")]
    Unavailable,
}

impl From<RuntimeError> for ControlError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::Timer(e) => Self::Rejected(e),
            RuntimeError::Stopped => Self::Unavailable,
        }
    }
}

impl ControlError {
    /// Returns true if the request was refused rather than failed.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::UnknownTask(_))
    }
}

/// Front for timer control and status.
#[derive(Clone)]
pub struct ControlSurface {
    timer: TimerHandle,
    tasks: Arc<dyn TaskStore>,
    dashboard: Dashboard,
    flash: watch::Receiver<bool>,
}

impl ControlSurface {
    pub fn new(
        timer: TimerHandle,
        tasks: Arc<dyn TaskStore>,
        dashboard: Dashboard,
        flash: watch::Receiver<bool>,
    ) -> Self {
        Self {
            timer,
            tasks,
            dashboard,
            flash,
        }
    }

    pub async fn start(&self) -> Result<ResponseData, ControlError> {
        let snapshot = self.timer.start().await?;
        Ok(self.render(snapshot))
    }

    pub async fn pause(&self) -> Result<ResponseData, ControlError> {
        let snapshot = self.timer.pause().await?;
        Ok(self.render(snapshot))
    }

    pub async fn reset(&self) -> Result<ResponseData, ControlError> {
        let snapshot = self.timer.reset().await?;
        Ok(self.render(snapshot))
    }

    pub async fn select_mode(&self, name: &str) -> Result<ResponseData, ControlError> {
        let snapshot = self.timer.select_mode(name).await?;
        Ok(self.render(snapshot))
    }

    /// Selects a task from the task list by id.
    pub async fn select_task(&self, id: TaskId) -> Result<ResponseData, ControlError> {
        let name = self
            .tasks
            .get_task_name(id)
            .await?
            .ok_or(ControlError::UnknownTask(id))?;
        debug!(id, name = %name, "Task selected");

        let snapshot = self
            .timer
            .select_task(Some(SelectedTask::new(Some(id), name)))
            .await?;
        Ok(self.render(snapshot))
    }

    pub async fn clear_task(&self) -> Result<ResponseData, ControlError> {
        let snapshot = self.timer.select_task(None).await?;
        Ok(self.render(snapshot))
    }

    /// Drops the selection if it refers to a deleted task.
    pub async fn task_deleted(&self, id: TaskId) -> Result<ResponseData, ControlError> {
        let snapshot = self.timer.forget_task(id).await?;
        Ok(self.render(snapshot))
    }

    pub async fn status(&self) -> Result<ResponseData, ControlError> {
        let snapshot = self.timer.snapshot().await?;
        Ok(self.render(snapshot))
    }

    fn render(&self, snapshot: TimerSnapshot) -> ResponseData {
        let TimerSnapshot {
            state,
            selected_task,
            auto_start_pending,
        } = snapshot;
        let projection = project(&state);
        let dashboard = self.dashboard.current();

        ResponseData {
            mode: state.mode.name.clone(),
            color: state.mode.color.clone(),
            phase: state.phase,
            running: state.running,
            remaining_seconds: state.remaining_seconds,
            total_seconds: state.total_seconds,
            time_text: projection.time_text,
            phase_label: projection.phase_label.to_string(),
            progress: projection.progress,
            title: title_text(&state),
            task_name: selected_task.map(|t| t.display_name().to_string()),
            controls: Affordances::from_running(state.running),
            auto_start_pending,
            stats: dashboard.stats,
            warning: dashboard.warning,
            flash: *self.flash.borrow(),
        }
    }
}
