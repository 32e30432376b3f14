//! Session reporter.
//!
//! Logs one session record per completed work phase and refreshes the
//! aggregate statistics. Reporting is fire-and-forget: the timer never
//! waits for it, and failures only surface as warnings.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{SessionStore, TaskStore};
use crate::types::{Mode, SelectedTask, SessionRecord, Stats, UNNAMED_TASK};

/// Result of a reporting step, published for the render target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The session was stored
    Recorded(SessionRecord),
    /// Statistics were fetched after a report attempt
    StatsRefreshed(Stats),
    /// A step failed; the message is user-facing
    Warning(String),
}

/// Reports completed work phases to the persistence collaborator.
#[derive(Clone)]
pub struct SessionReporter {
    sessions: Arc<dyn SessionStore>,
    tasks: Arc<dyn TaskStore>,
    outcomes: mpsc::UnboundedSender<ReportOutcome>,
}

impl SessionReporter {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        tasks: Arc<dyn TaskStore>,
        outcomes: mpsc::UnboundedSender<ReportOutcome>,
    ) -> Self {
        Self {
            sessions,
            tasks,
            outcomes,
        }
    }

    /// Spawns the report for one completed work phase.
    pub fn report(&self, mode: Mode, task: Option<SelectedTask>) -> JoinHandle<()> {
        let reporter = self.clone();
        tokio::spawn(async move { reporter.run(&mode, task.as_ref()).await })
    }

    /// Records the session, then refreshes stats whether or not recording
    /// succeeded.
    pub async fn run(&self, mode: &Mode, task: Option<&SelectedTask>) {
        let task_name = match task {
            Some(task) => Some(self.resolve_task_name(task).await),
            None => None,
        };
        let record = SessionRecord::new(mode, task_name.as_deref());

        match self.sessions.record_session(&record).await {
            Ok(()) => {
                debug!(mode = %record.mode, task = %record.task, "Session recorded");
                self.publish(ReportOutcome::Recorded(record));
            }
            Err(e) => self.warn(format!("Could not log session: {}", e)),
        }

        self.refresh_stats().await;
    }

    /// Fetches stats and publishes them.
    pub async fn refresh_stats(&self) {
        match self.sessions.fetch_stats().await {
            Ok(stats) => self.publish(ReportOutcome::StatsRefreshed(stats)),
            Err(e) => self.warn(format!("Could not load stats: {}", e)),
        }
    }

    /// Current name from the task list, then the name captured at
    /// selection, then the unnamed placeholder.
    async fn resolve_task_name(&self, task: &SelectedTask) -> String {
        if let Some(id) = task.id {
            match self.tasks.get_task_name(id).await {
                Ok(Some(name)) if !name.trim().is_empty() => return name,
                Ok(_) => debug!(id, "Selected task not found in task list"),
                Err(e) => debug!(id, "Task lookup failed: {}", e),
            }
        }
        if task.name.trim().is_empty() {
            UNNAMED_TASK.to_string()
        } else {
            task.name.clone()
        }
    }

    fn warn(&self, message: String) {
        warn!("{}", message);
        self.publish(ReportOutcome::Warning(message));
    }

    fn publish(&self, outcome: ReportOutcome) {
        if self.outcomes.send(outcome).is_err() {
            debug!("Report outcome dropped: no receiver");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockStore;
    use crate::types::{Task, TaskId, NO_TASK_SELECTED};

    fn task(id: TaskId, name: &str) -> Task {
        Task {
            id,
            name: name.to_string(),
            estimated_minutes: 30,
            completed: false,
            category: None,
            custom_category: None,
            course: None,
            priority: None,
            urgency: None,
        }
    }

    fn create_reporter(
        store: Arc<MockStore>,
    ) -> (SessionReporter, mpsc::UnboundedReceiver<ReportOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SessionReporter::new(store.clone(), store, tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ReportOutcome>) -> Vec<ReportOutcome> {
        let mut out = Vec::new();
        while let Ok(outcome) = rx.try_recv() {
            out.push(outcome);
        }
        out
    }

    mod task_name_tests {
        use super::*;

        #[tokio::test]
        async fn test_no_task_selected() {
            let store = Arc::new(MockStore::new());
            let (reporter, _rx) = create_reporter(store.clone());

            reporter.run(&Mode::light(), None).await;

            let sessions = store.sessions();
            assert_eq!(sessions.len(), 1);
            assert_eq!(sessions[0].task, NO_TASK_SELECTED);
            assert_eq!(sessions[0].mode, "light");
            assert_eq!(sessions[0].work_minutes, 25);
            assert_eq!(store.task_calls(), 0);
        }

        #[tokio::test]
        async fn test_current_name_wins() {
            let store = Arc::new(MockStore::with_tasks(vec![task(7, "Chapter 3")]));
            let (reporter, _rx) = create_reporter(store.clone());
            let selected = SelectedTask::new(Some(7), "Chapter 2");

            reporter.run(&Mode::deep(), Some(&selected)).await;

            assert_eq!(store.sessions()[0].task, "Chapter 3");
        }

        #[tokio::test]
        async fn test_falls_back_to_captured_name() {
            let store = Arc::new(MockStore::new());
            let (reporter, _rx) = create_reporter(store.clone());
            let selected = SelectedTask::new(Some(7), "Chapter 2");

            reporter.run(&Mode::light(), Some(&selected)).await;

            assert_eq!(store.sessions()[0].task, "Chapter 2");
        }

        #[tokio::test]
        async fn test_lookup_failure_falls_back() {
            let store = Arc::new(MockStore::with_tasks(vec![task(7, "Chapter 3")]));
            store.fail_tasks(true);
            let (reporter, _rx) = create_reporter(store.clone());
            let selected = SelectedTask::new(Some(7), "Chapter 2");

            reporter.run(&Mode::light(), Some(&selected)).await;

            assert_eq!(store.sessions()[0].task, "Chapter 2");
        }

        #[tokio::test]
        async fn test_blank_name_is_unnamed() {
            let store = Arc::new(MockStore::new());
            let (reporter, _rx) = create_reporter(store.clone());
            let selected = SelectedTask::new(None, "");

            reporter.run(&Mode::light(), Some(&selected)).await;

            assert_eq!(store.sessions()[0].task, UNNAMED_TASK);
        }
    }

    mod outcome_tests {
        use super::*;

        #[tokio::test]
        async fn test_success_publishes_record_then_stats() {
            let store = Arc::new(MockStore::new());
            let (reporter, mut rx) = create_reporter(store.clone());

            reporter.run(&Mode::medium(), None).await;

            let outcomes = drain(&mut rx);
            assert_eq!(outcomes.len(), 2);
            assert!(matches!(outcomes[0], ReportOutcome::Recorded(_)));
            assert_eq!(
                outcomes[1],
                ReportOutcome::StatsRefreshed(Stats {
                    total_pomodoros: 1,
                    total_minutes: 35
                })
            );
        }

        #[tokio::test]
        async fn test_record_failure_still_refreshes_stats() {
            let store = Arc::new(MockStore::new());
            store.fail_record(true);
            let (reporter, mut rx) = create_reporter(store.clone());

            reporter.run(&Mode::light(), None).await;

            let outcomes = drain(&mut rx);
            assert!(matches!(&outcomes[0], ReportOutcome::Warning(m) if m.contains("log session")));
            assert_eq!(outcomes[1], ReportOutcome::StatsRefreshed(Stats::default()));
            assert_eq!(store.stats_calls(), 1);
        }

        #[tokio::test]
        async fn test_stats_failure_is_a_warning() {
            let store = Arc::new(MockStore::new());
            store.fail_stats(true);
            let (reporter, mut rx) = create_reporter(store.clone());

            reporter.run(&Mode::light(), None).await;

            let outcomes = drain(&mut rx);
            assert!(matches!(outcomes[0], ReportOutcome::Recorded(_)));
            assert!(matches!(&outcomes[1], ReportOutcome::Warning(m) if m.contains("stats")));
        }

        #[tokio::test]
        async fn test_report_spawns() {
            let store = Arc::new(MockStore::new());
            let (reporter, _rx) = create_reporter(store.clone());

            reporter.report(Mode::light(), None).await.unwrap();

            assert_eq!(store.session_count(), 1);
        }

        #[tokio::test]
        async fn test_closed_outcome_channel_is_harmless() {
            let store = Arc::new(MockStore::new());
            let (reporter, rx) = create_reporter(store.clone());
            drop(rx);

            reporter.run(&Mode::light(), None).await;

            assert_eq!(store.session_count(), 1);
        }
    }
}
