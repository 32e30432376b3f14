//! Core data types for the Pomodoro board.
//!
//! This module defines the data structures used for:
//! - Timer state and phases
//! - Session records and aggregate statistics
//! - Tasks as served by the remote task API
//! - IPC request/response serialization

mod mode;

pub use mode::{ConfigError, Mode, ModeRegistry};

use serde::{Deserialize, Serialize};

/// Placeholder logged as the task of a session when no task is selected.
pub const NO_TASK_SELECTED: &str = "No task selected";

/// Placeholder used when a selected task has no resolvable name.
pub const UNNAMED_TASK: &str = "Unnamed";

// ============================================================================
// TimerPhase
// ============================================================================

/// The two countdown segments of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Focused work
    #[default]
    Work,
    /// Break after a completed work phase
    Break,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Work => "work",
            TimerPhase::Break => "break",
        }
    }

    /// Returns the upper-case label shown next to the countdown.
    pub fn label(&self) -> &'static str {
        match self {
            TimerPhase::Work => "WORK",
            TimerPhase::Break => "BREAK",
        }
    }

    /// Returns the capitalized name used in window titles.
    pub fn title(&self) -> &'static str {
        match self {
            TimerPhase::Work => "Work",
            TimerPhase::Break => "Break",
        }
    }

    /// Returns the phase that follows this one.
    pub fn next(&self) -> Self {
        match self {
            TimerPhase::Work => TimerPhase::Break,
            TimerPhase::Break => TimerPhase::Work,
        }
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Countdown state exclusively owned by the timer engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Active mode
    pub mode: Mode,
    /// Current phase
    pub phase: TimerPhase,
    /// Length of the current phase in seconds
    pub total_seconds: u32,
    /// Seconds left in the current phase
    pub remaining_seconds: u32,
    /// Whether the countdown is ticking
    pub running: bool,
}

impl TimerState {
    /// Creates an idle work state for the given mode.
    pub fn new(mode: Mode) -> Self {
        let total = mode.work_seconds();
        Self {
            mode,
            phase: TimerPhase::Work,
            total_seconds: total,
            remaining_seconds: total,
            running: false,
        }
    }

    /// Rewinds to the start of `phase` for the current mode without running.
    pub fn rewind(&mut self, phase: TimerPhase) {
        self.phase = phase;
        self.total_seconds = self.mode.phase_seconds(phase);
        self.remaining_seconds = self.total_seconds;
        self.running = false;
    }

    /// Switches to `mode` and rewinds to the start of its work phase.
    pub fn switch_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.rewind(TimerPhase::Work);
    }

    /// Decrements the countdown by one second.
    ///
    /// Returns true if the phase has completed; the state is then stopped.
    pub fn tick(&mut self) -> bool {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.running = false;
            return true;
        }
        false
    }

    /// Returns true if the countdown is ticking.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns true if there is no time left in the current phase.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_seconds == 0
    }

    /// Checks the state invariants.
    pub fn is_consistent(&self) -> bool {
        self.remaining_seconds <= self.total_seconds
            && self.total_seconds == self.mode.phase_seconds(self.phase)
            && !(self.running && self.remaining_seconds == 0)
    }
}

// ============================================================================
// Tasks and sessions
// ============================================================================

/// Identifier of a task in the remote task list.
pub type TaskId = u64;

/// Weak reference to the task currently being worked on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedTask {
    /// Task id, if the task came from the task list
    pub id: Option<TaskId>,
    /// Display name captured at selection time
    pub name: String,
}

impl SelectedTask {
    pub fn new(id: Option<TaskId>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the captured name, or the unnamed placeholder if blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            UNNAMED_TASK
        } else {
            &self.name
        }
    }
}

/// Log entry describing one completed work phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Mode name
    pub mode: String,
    /// Task display name or the "No task selected" placeholder
    pub task: String,
    /// Work length of the mode in minutes
    pub work_minutes: u32,
}

impl SessionRecord {
    /// Builds the record for a completed work phase of `mode`.
    pub fn new(mode: &Mode, task_name: Option<&str>) -> Self {
        Self {
            mode: mode.name.clone(),
            task: task_name.unwrap_or(NO_TASK_SELECTED).to_string(),
            work_minutes: mode.work_minutes,
        }
    }
}

/// Aggregate statistics served by the session API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_pomodoros: u64,
    pub total_minutes: u64,
}

impl Stats {
    /// "1 pomodoro" / "3 pomodoros".
    pub fn pomodoros_text(&self) -> String {
        let suffix = if self.total_pomodoros == 1 { "" } else { "s" };
        format!("{} pomodoro{}", self.total_pomodoros, suffix)
    }

    /// "50 min focused".
    pub fn minutes_text(&self) -> String {
        format!("{} min focused", self.total_minutes)
    }
}

/// A task as returned by the task API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub estimated_minutes: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub custom_category: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
}

/// Payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub estimated_minutes: u32,
    pub category: String,
    pub custom_category: String,
    pub course: String,
    pub priority: String,
    pub urgency: String,
}

// ============================================================================
// Snapshots
// ============================================================================

/// Enabled state of the timer controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordances {
    pub start_enabled: bool,
    pub pause_enabled: bool,
    pub mode_select_enabled: bool,
}

impl Affordances {
    /// Derives the control state from the running flag.
    pub fn from_running(running: bool) -> Self {
        Self {
            start_enabled: !running,
            pause_enabled: running,
            mode_select_enabled: !running,
        }
    }
}

/// Point-in-time copy of the engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub selected_task: Option<SelectedTask>,
    /// True between a work completion and the automatic start of the break
    pub auto_start_pending: bool,
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset to the start of the work phase
    Reset,
    /// Switch to another mode
    SelectMode { mode: String },
    /// Select a task from the task list
    SelectTask { id: TaskId },
    /// Clear the selected task
    ClearTask,
    /// A task was deleted; clears the selection if it matches
    TaskDeleted { id: TaskId },
    /// Query the current status
    Status,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub mode: String,
    pub color: String,
    pub phase: TimerPhase,
    pub running: bool,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub time_text: String,
    pub phase_label: String,
    pub progress: f64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    pub controls: Affordances,
    pub auto_start_pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default)]
    pub flash: bool,
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Returns true for error responses.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================
