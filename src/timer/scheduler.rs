//! Cancelable deferred callbacks for the timer engine.
//!
//! The engine never touches ambient timers. It arms and cancels two owned
//! handles through the [`Scheduler`] trait:
//! - the recurring one-second tick
//! - the one-shot break auto-start
//!
//! [`TokioScheduler`] backs them with `tokio::time`; cancelling drops the
//! handle, so a cancelled callback can never be observed afterwards.
//! [`ManualScheduler`] only records what is armed and lets tests fire
//! callbacks by hand.

use std::future::pending;
use std::pin::Pin;

use tokio::time::{interval_at, sleep, Duration, Instant, Interval, MissedTickBehavior, Sleep};

/// Period of the countdown tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A deferred callback that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// One second elapsed while running
    Tick,
    /// The break auto-start delay elapsed
    AutoStart,
}

/// Owner of the engine's deferred callbacks.
pub trait Scheduler {
    /// Arms the recurring tick. The first tick fires one period from now.
    /// Re-arming replaces any previous tick.
    fn arm_tick(&mut self);

    /// Cancels the recurring tick. Idempotent.
    fn cancel_tick(&mut self);

    /// Arms the one-shot auto-start, replacing any pending one.
    fn arm_auto_start(&mut self, delay: Duration);

    /// Cancels the pending auto-start. Idempotent.
    fn cancel_auto_start(&mut self);

    /// Returns true while the tick is armed.
    fn tick_armed(&self) -> bool;

    /// Returns true while an auto-start is pending.
    fn auto_start_pending(&self) -> bool;
}

// ============================================================================
// TokioScheduler
// ============================================================================

/// Scheduler backed by `tokio::time`.
#[derive(Debug, Default)]
pub struct TokioScheduler {
    ticker: Option<Interval>,
    auto_start: Option<Pin<Box<Sleep>>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the next armed callback.
    ///
    /// Pends forever when nothing is armed. Cancel safe: dropping the
    /// returned future loses no callback.
    pub async fn next(&mut self) -> Deferred {
        let fired = tokio::select! {
            _ = next_tick(&mut self.ticker) => Deferred::Tick,
            _ = auto_start_elapsed(&mut self.auto_start) => Deferred::AutoStart,
        };
        if fired == Deferred::AutoStart {
            self.auto_start = None;
        }
        fired
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending::<()>().await,
    }
}

async fn auto_start_elapsed(auto_start: &mut Option<Pin<Box<Sleep>>>) {
    match auto_start {
        Some(delay) => delay.as_mut().await,
        None => pending::<()>().await,
    }
}

impl Scheduler for TokioScheduler {
    fn arm_tick(&mut self) {
        let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        // Every elapsed second must be counted.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        self.ticker = Some(ticker);
    }

    fn cancel_tick(&mut self) {
        self.ticker = None;
    }

    fn arm_auto_start(&mut self, delay: Duration) {
        self.auto_start = Some(Box::pin(sleep(delay)));
    }

    fn cancel_auto_start(&mut self) {
        self.auto_start = None;
    }

    fn tick_armed(&self) -> bool {
        self.ticker.is_some()
    }

    fn auto_start_pending(&self) -> bool {
        self.auto_start.is_some()
    }
}

// ============================================================================
// ManualScheduler
// ============================================================================

/// Scheduler that records arm/cancel calls without any clock.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    tick_armed: bool,
    auto_start: Option<Duration>,
    tick_arm_count: usize,
    auto_start_arm_count: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay of the pending auto-start, if any.
    pub fn pending_auto_start(&self) -> Option<Duration> {
        self.auto_start
    }

    /// Number of times the tick has been armed.
    pub fn tick_arm_count(&self) -> usize {
        self.tick_arm_count
    }

    /// Number of times an auto-start has been armed.
    pub fn auto_start_arm_count(&self) -> usize {
        self.auto_start_arm_count
    }
}

impl Scheduler for ManualScheduler {
    fn arm_tick(&mut self) {
        self.tick_armed = true;
        self.tick_arm_count += 1;
    }

    fn cancel_tick(&mut self) {
        self.tick_armed = false;
    }

    fn arm_auto_start(&mut self, delay: Duration) {
        self.auto_start = Some(delay);
        self.auto_start_arm_count += 1;
    }

    fn cancel_auto_start(&mut self) {
        self.auto_start = None;
    }

    fn tick_armed(&self) -> bool {
        self.tick_armed
    }

    fn auto_start_pending(&self) -> bool {
        self.auto_start.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
