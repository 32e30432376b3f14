//! Timer engine for the Pomodoro board.
//!
//! This module provides the countdown state machine:
//! - Idle/Running × Work/Break transitions
//! - One-second ticks driven through a [`Scheduler`]
//! - `PhaseComplete` events for the alert trigger and session reporter
//! - Automatic start of the break after a completed work phase
//!
//! The break after a work phase starts by itself after a short delay, but
//! the work phase after a break waits for a manual `start()`.

use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{debug, info};

use crate::types::{
    Mode, ModeRegistry, SelectedTask, TimerPhase, TimerSnapshot, TimerState,
};

use super::scheduler::{Deferred, Scheduler};

/// Default delay between a work completion and the automatic break start.
pub const DEFAULT_AUTO_START_DELAY: Duration = Duration::from_secs(2);

// ============================================================================
// TimerError
// ============================================================================

/// Rejected timer operations. None of them change the timer state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The operation is not allowed while the countdown is running.
    #[error("timer is already running")]
    AlreadyRunning,

    /// The operation requires a running countdown.
    #[error("timer is not running")]
    NotRunning,

    /// `start` was requested with no time left in the phase.
    #[error("no time remaining in the current phase; reset first")]
    NoTimeRemaining,

    /// The requested mode is not registered.
    #[error("unknown mode '{0}'")]
    UnknownMode(String),
}

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for the render target, alerts and session reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started or resumed
    Started {
        phase: TimerPhase,
        remaining_seconds: u32,
    },
    /// Countdown paused
    Paused { remaining_seconds: u32 },
    /// Timer reset to the start of the work phase
    Reset,
    /// A mode was selected
    ModeSelected { mode: String },
    /// Selected task changed
    TaskSelected { task: Option<SelectedTask> },
    /// One second elapsed
    Tick { remaining_seconds: u32 },
    /// The countdown of `phase` reached zero
    PhaseComplete {
        phase: TimerPhase,
        mode: Mode,
        task: Option<SelectedTask>,
    },
    /// The break will start automatically after `delay`
    AutoStartScheduled { delay: Duration },
    /// A pending automatic break start was cancelled
    AutoStartCancelled,
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the countdown state.
pub struct TimerEngine<S: Scheduler> {
    /// Registered modes
    registry: ModeRegistry,
    /// Current timer state
    state: TimerState,
    /// Task being worked on (weak reference into the task list)
    selected_task: Option<SelectedTask>,
    /// Owner of the tick and auto-start callbacks
    scheduler: S,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    /// Delay before the break starts by itself
    auto_start_delay: Duration,
}

impl<S: Scheduler> TimerEngine<S> {
    /// Creates an idle engine in the work phase of `initial_mode`.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::UnknownMode`] if `initial_mode` is not registered.
    pub fn new(
        registry: ModeRegistry,
        initial_mode: &str,
        scheduler: S,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Result<Self, TimerError> {
        let mode = registry
            .get(initial_mode)
            .cloned()
            .ok_or_else(|| TimerError::UnknownMode(initial_mode.to_string()))?;

        Ok(Self {
            registry,
            state: TimerState::new(mode),
            selected_task: None,
            scheduler,
            event_tx,
            auto_start_delay: DEFAULT_AUTO_START_DELAY,
        })
    }

    /// Overrides the break auto-start delay.
    pub fn with_auto_start_delay(mut self, delay: Duration) -> Self {
        self.auto_start_delay = delay;
        self
    }

    /// Sends an event. A closed receiver only means nobody is listening.
    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Timer event dropped: no receiver");
        }
    }

    fn cancel_pending_auto_start(&mut self) -> bool {
        if self.scheduler.auto_start_pending() {
            self.scheduler.cancel_auto_start();
            self.emit(TimerEvent::AutoStartCancelled);
            return true;
        }
        false
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Switches to the named mode and rewinds to the start of its work phase.
    ///
    /// Rewinds even if the mode is already active.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer is running or the mode is unknown.
    pub fn select_mode(&mut self, name: &str) -> Result<(), TimerError> {
        if self.state.is_running() {
            return Err(TimerError::AlreadyRunning);
        }
        let mode = self
            .registry
            .get(name)
            .cloned()
            .ok_or_else(|| TimerError::UnknownMode(name.to_string()))?;

        self.cancel_pending_auto_start();
        self.state.switch_mode(mode);
        debug!(mode = name, "Mode selected");
        self.emit(TimerEvent::ModeSelected {
            mode: name.to_string(),
        });
        Ok(())
    }

    /// Starts or resumes the countdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer is already running or the phase has
    /// no time left.
    pub fn start(&mut self) -> Result<(), TimerError> {
        if self.state.is_running() {
            return Err(TimerError::AlreadyRunning);
        }
        if self.state.is_exhausted() {
            return Err(TimerError::NoTimeRemaining);
        }

        self.scheduler.cancel_auto_start();
        self.state.running = true;
        self.scheduler.arm_tick();

        debug!(
            phase = self.state.phase.as_str(),
            remaining = self.state.remaining_seconds,
            "Timer started"
        );
        self.emit(TimerEvent::Started {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
        });
        Ok(())
    }

    /// Pauses the countdown, keeping the remaining time.
    ///
    /// While a break is waiting to start automatically, pausing cancels
    /// the automatic start instead.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NotRunning`] if there is nothing to pause.
    pub fn pause(&mut self) -> Result<(), TimerError> {
        if !self.state.is_running() {
            if self.cancel_pending_auto_start() {
                debug!("Pending break start cancelled by pause");
                return Ok(());
            }
            return Err(TimerError::NotRunning);
        }

        self.scheduler.cancel_tick();
        self.state.running = false;

        debug!(remaining = self.state.remaining_seconds, "Timer paused");
        self.emit(TimerEvent::Paused {
            remaining_seconds: self.state.remaining_seconds,
        });
        Ok(())
    }

    /// Stops the countdown and rewinds to the start of the work phase.
    /// Always legal.
    pub fn reset(&mut self) {
        self.scheduler.cancel_tick();
        self.cancel_pending_auto_start();
        self.state.rewind(TimerPhase::Work);

        debug!(mode = %self.state.mode.name, "Timer reset");
        self.emit(TimerEvent::Reset);
    }

    /// Selects (or clears) the task being worked on. Always legal.
    pub fn select_task(&mut self, task: Option<SelectedTask>) {
        debug!(?task, "Task selection changed");
        self.selected_task = task.clone();
        self.emit(TimerEvent::TaskSelected { task });
    }

    /// Clears the selection if it refers to `id`. Returns true if cleared.
    pub fn forget_task(&mut self, id: crate::types::TaskId) -> bool {
        let matches = self
            .selected_task
            .as_ref()
            .is_some_and(|task| task.id == Some(id));
        if matches {
            self.select_task(None);
        }
        matches
    }

    // ------------------------------------------------------------------------
    // Deferred callbacks
    // ------------------------------------------------------------------------

    /// Runs a deferred callback that came due.
    pub fn handle(&mut self, deferred: Deferred) {
        match deferred {
            Deferred::Tick => self.tick(),
            Deferred::AutoStart => self.auto_start(),
        }
    }

    /// Decrements the countdown by one second.
    ///
    /// Ticks arriving while idle are ignored.
    fn tick(&mut self) {
        if !self.state.is_running() {
            debug!("Ignoring tick while idle");
            return;
        }

        let completed = self.state.tick();
        self.emit(TimerEvent::Tick {
            remaining_seconds: self.state.remaining_seconds,
        });

        if completed {
            self.scheduler.cancel_tick();
            self.handle_phase_complete();
        }
    }

    /// Handles the end of a phase (the state is already stopped).
    fn handle_phase_complete(&mut self) {
        let finished = self.state.phase;
        info!(
            phase = finished.as_str(),
            mode = %self.state.mode.name,
            "Phase complete"
        );

        self.emit(TimerEvent::PhaseComplete {
            phase: finished,
            mode: self.state.mode.clone(),
            task: self.selected_task.clone(),
        });

        self.state.rewind(finished.next());
        // Only breaks start themselves.
        if finished == TimerPhase::Work {
            self.scheduler.arm_auto_start(self.auto_start_delay);
            self.emit(TimerEvent::AutoStartScheduled {
                delay: self.auto_start_delay,
            });
        }
    }

    fn auto_start(&mut self) {
        self.scheduler.cancel_auto_start();
        if let Err(e) = self.start() {
            debug!("Automatic break start skipped: {}", e);
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns a reference to the current timer state.
    pub fn get_state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the selected task, if any.
    pub fn selected_task(&self) -> Option<&SelectedTask> {
        self.selected_task.as_ref()
    }

    /// Returns the registered modes.
    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    /// Returns true while a break is waiting to start automatically.
    pub fn auto_start_pending(&self) -> bool {
        self.scheduler.auto_start_pending()
    }

    /// Returns a copy of the engine state.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state.clone(),
            selected_task: self.selected_task.clone(),
            auto_start_pending: self.auto_start_pending(),
        }
    }

    /// Returns the scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Returns the scheduler mutably.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub fn get_state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }
}

// ============================================================================
// Tests
// ============================================================================
