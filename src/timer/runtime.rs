//! Actor that drives a [`TimerEngine`] on the tokio runtime.
//!
//! The engine is owned by a single task. Control operations arrive over a
//! command channel and deferred callbacks come from the owned
//! [`TokioScheduler`], so every state change is serialized through one
//! `select!` loop.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::types::{SelectedTask, TaskId, TimerSnapshot};

use super::engine::{TimerEngine, TimerError};
use super::scheduler::TokioScheduler;

/// Errors returned by a [`TimerHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The engine rejected the operation.
    #[error(transparent)]
    Timer(#[from] TimerError),

    /// The timer task has shut down.
    #[error("timer task is not running")]
    Stopped,
}

/// Operation requested from the timer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Pause,
    Reset,
    SelectMode(String),
    SelectTask(Option<SelectedTask>),
    ForgetTask(TaskId),
    Snapshot,
}

struct Envelope {
    command: ControlCommand,
    reply: oneshot::Sender<Result<TimerSnapshot, TimerError>>,
}

// ============================================================================
// TimerHandle
// ============================================================================

/// Cloneable handle for sending control operations to the timer task.
#[derive(Clone)]
pub struct TimerHandle {
    tx: mpsc::Sender<Envelope>,
}

impl TimerHandle {
    /// Sends a command and waits for the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns the engine rejection, or [`RuntimeError::Stopped`] if the
    /// timer task is gone.
    pub async fn send(&self, command: ControlCommand) -> Result<TimerSnapshot, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope { command, reply })
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        let result = rx.await.map_err(|_| RuntimeError::Stopped)?;
        Ok(result?)
    }

    pub async fn start(&self) -> Result<TimerSnapshot, RuntimeError> {
        self.send(ControlCommand::Start).await
    }

    pub async fn pause(&self) -> Result<TimerSnapshot, RuntimeError> {
        self.send(ControlCommand::Pause).await
    }

    pub async fn reset(&self) -> Result<TimerSnapshot, RuntimeError> {
        self.send(ControlCommand::Reset).await
    }

    pub async fn select_mode(&self, name: &str) -> Result<TimerSnapshot, RuntimeError> {
        self.send(ControlCommand::SelectMode(name.to_string())).await
    }

    pub async fn select_task(
        &self,
        task: Option<SelectedTask>,
    ) -> Result<TimerSnapshot, RuntimeError> {
        self.send(ControlCommand::SelectTask(task)).await
    }

    /// Clears the selected task if it refers to `id`.
    pub async fn forget_task(&self, id: TaskId) -> Result<TimerSnapshot, RuntimeError> {
        self.send(ControlCommand::ForgetTask(id)).await
    }

    pub async fn snapshot(&self) -> Result<TimerSnapshot, RuntimeError> {
        self.send(ControlCommand::Snapshot).await
    }
}

// ============================================================================
// TimerRuntime
// ============================================================================

/// Command channel capacity.
const COMMAND_BUFFER: usize = 32;

/// Owner of the engine inside the timer task.
pub struct TimerRuntime {
    engine: TimerEngine<TokioScheduler>,
    commands: mpsc::Receiver<Envelope>,
}

impl TimerRuntime {
    /// Creates the runtime and its handle without spawning.
    pub fn new(engine: TimerEngine<TokioScheduler>) -> (Self, TimerHandle) {
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
        (Self { engine, commands }, TimerHandle { tx })
    }

    /// Spawns the timer task on the current runtime.
    ///
    /// The task exits once every [`TimerHandle`] is dropped.
    pub fn spawn(engine: TimerEngine<TokioScheduler>) -> (TimerHandle, JoinHandle<()>) {
        let (runtime, handle) = Self::new(engine);
        let join = tokio::spawn(runtime.run());
        (handle, join)
    }

    /// Runs the command / callback loop until all handles are dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                envelope = self.commands.recv() => match envelope {
                    Some(envelope) => self.dispatch(envelope),
                    None => break,
                },
                deferred = self.engine.scheduler_mut().next() => {
                    self.engine.handle(deferred);
                }
            }
        }
        debug!("Timer task stopped");
    }

    fn dispatch(&mut self, envelope: Envelope) {
        let Envelope { command, reply } = envelope;
        let engine = &mut self.engine;

        let result = match command {
            ControlCommand::Start => engine.start(),
            ControlCommand::Pause => engine.pause(),
            ControlCommand::Reset => {
                engine.reset();
                Ok(())
            }
            ControlCommand::SelectMode(name) => engine.select_mode(&name),
            ControlCommand::SelectTask(task) => {
                engine.select_task(task);
                Ok(())
            }
            ControlCommand::ForgetTask(id) => {
                engine.forget_task(id);
                Ok(())
            }
            ControlCommand::Snapshot => Ok(()),
        };

        if reply.send(result.map(|()| engine.snapshot())).is_err() {
            debug!("Control reply dropped: caller went away");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::engine::TimerEvent;
    use crate::types::{ModeRegistry, TimerPhase};
    use tokio::time::{sleep, Duration};

    fn spawn_light() -> (TimerHandle, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine =
            TimerEngine::new(ModeRegistry::reference(), "light", TokioScheduler::new(), tx)
                .unwrap();
        let (handle, _join) = TimerRuntime::spawn(engine);
        (handle, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_follows_clock() {
        let (handle, _rx) = spawn_light();

        handle.start().await.unwrap();
        sleep(Duration::from_millis(10_500)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state.remaining_seconds, 1490);
        assert!(snapshot.state.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejections_surface_as_timer_errors() {
        let (handle, _rx) = spawn_light();

        let err = handle.pause().await.unwrap_err();
        assert_eq!(err, RuntimeError::Timer(TimerError::NotRunning));

        handle.start().await.unwrap();
        let err = handle.select_mode("deep").await.unwrap_err();
        assert_eq!(err, RuntimeError::Timer(TimerError::AlreadyRunning));
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_timer_does_not_move() {
        let (handle, _rx) = spawn_light();

        handle.start().await.unwrap();
        sleep(Duration::from_millis(3_500)).await;
        handle.pause().await.unwrap();
        sleep(Duration::from_secs(60)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state.remaining_seconds, 1497);
        assert!(!snapshot.state.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_start_after_work() {
        let (handle, _rx) = spawn_light();

        handle.start().await.unwrap();
        sleep(Duration::from_millis(1_500_500)).await;

        let gap = handle.snapshot().await.unwrap();
        assert_eq!(gap.state.phase, TimerPhase::Break);
        assert!(!gap.state.running);
        assert!(gap.auto_start_pending);

        sleep(Duration::from_secs(2)).await;

        let started = handle.snapshot().await.unwrap();
        assert_eq!(started.state.phase, TimerPhase::Break);
        assert_eq!(started.state.remaining_seconds, 300);
        assert!(started.state.running);
        assert!(!started.auto_start_pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_exits_when_handles_dropped() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let engine =
            TimerEngine::new(ModeRegistry::reference(), "light", TokioScheduler::new(), tx)
                .unwrap();
        let (handle, join) = TimerRuntime::spawn(engine);

        drop(handle);
        join.await.unwrap();
    }
}
