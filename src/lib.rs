//! Pomodoro Board Library
//!
//! This library provides the core functionality for the Pomodoro board.
//! It includes:
//! - Mode registry and timer engine with work/break cycling
//! - Session reporting against a remote session / task API
//! - Presentation helpers (time text, progress, window title)
//! - Sound chime and visual flash alerts
//! - IPC server/client for daemon-CLI communication
//! - Task list, clock and calendar helpers for the CLI

pub mod api;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod presentation;
pub mod report;
pub mod sound;
pub mod tasks;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    IpcRequest, IpcResponse, Mode, ModeRegistry, ResponseData, SelectedTask, SessionRecord,
    Stats, TimerPhase, TimerState,
};

pub use api::{ApiClient, ApiError, MockStore, SessionStore, TaskStore};
pub use config::AppConfig;
pub use daemon::{build_services, ControlError, ControlSurface};
pub use timer::{TimerEngine, TimerError, TimerEvent, TimerHandle, TimerRuntime};

// Re-export sound types
pub use sound::{AlertTrigger, Chime, MockSoundPlayer, SoundError, SoundPlayer};
