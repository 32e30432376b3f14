//! Countdown timer.
//!
//! - `engine`: state machine with start/pause/reset/select_mode
//! - `scheduler`: cancelable tick and auto-start callbacks
//! - `runtime`: tokio task that owns the engine

pub mod engine;
pub mod runtime;
pub mod scheduler;

pub use engine::{TimerEngine, TimerError, TimerEvent, DEFAULT_AUTO_START_DELAY};
pub use runtime::{ControlCommand, RuntimeError, TimerHandle, TimerRuntime};
pub use scheduler::{Deferred, ManualScheduler, Scheduler, TokioScheduler, TICK_PERIOD};
