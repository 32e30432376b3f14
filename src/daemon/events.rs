//! Timer event dispatch.
//!
//! Routes engine events to the alert trigger and the session reporter, and
//! folds report outcomes into the dashboard shown by `status`.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace};

use crate::report::{ReportOutcome, SessionReporter};
use crate::sound::AlertTrigger;
use crate::timer::TimerEvent;
use crate::types::{Stats, TimerPhase};

// ============================================================================
// Dashboard
// ============================================================================

/// Latest reporting results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub stats: Option<Stats>,
    /// Last reporting failure, cleared by the next successful record
    pub warning: Option<String>,
}

/// Shared, watchable dashboard state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    state: Arc<watch::Sender<DashboardState>>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Applies a report outcome.
    pub fn apply(&self, outcome: ReportOutcome) {
        self.state.send_modify(|state| match outcome {
            ReportOutcome::Recorded(_) => state.warning = None,
            ReportOutcome::StatsRefreshed(stats) => state.stats = Some(stats),
            ReportOutcome::Warning(message) => state.warning = Some(message),
        });
    }

    /// Returns a copy of the current state.
    pub fn current(&self) -> DashboardState {
        self.state.borrow().clone()
    }
}

// ============================================================================
// EventDispatcher
// ============================================================================

/// Consumer of timer events and report outcomes.
pub struct EventDispatcher {
    alert: AlertTrigger,
    reporter: SessionReporter,
    dashboard: Dashboard,
}

impl EventDispatcher {
    pub fn new(alert: AlertTrigger, reporter: SessionReporter, dashboard: Dashboard) -> Self {
        Self {
            alert,
            reporter,
            dashboard,
        }
    }

    /// Runs until the timer event channel closes.
    pub async fn run(
        self,
        mut timer_events: mpsc::UnboundedReceiver<TimerEvent>,
        mut outcomes: mpsc::UnboundedReceiver<ReportOutcome>,
    ) {
        loop {
            tokio::select! {
                event = timer_events.recv() => match event {
                    Some(event) => self.on_timer_event(event),
                    None => break,
                },
                Some(outcome) = outcomes.recv() => self.dashboard.apply(outcome),
            }
        }
        debug!("Event dispatcher stopped");
    }

    /// Handles one timer event.
    pub fn on_timer_event(&self, event: TimerEvent) {
        match event {
            TimerEvent::Tick { remaining_seconds } => {
                trace!(remaining_seconds, "Tick");
            }
            TimerEvent::PhaseComplete { phase, mode, task } => {
                self.alert.fire();
                match phase {
                    TimerPhase::Work => {
                        info!(mode = %mode.name, "Work phase complete, logging session");
                        self.reporter.report(mode, task);
                    }
                    TimerPhase::Break => {
                        info!(mode = %mode.name, "Break complete");
                    }
                }
            }
            other => debug!(?other, "Timer event"),
        }
    }
}
