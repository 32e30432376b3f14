//! In-memory store for testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::types::{SessionRecord, Stats, Task, TaskId};

use super::{ApiError, SessionStore, TaskStore};

/// Mock session and task store.
///
/// Records every call; failures can be switched on per operation.
#[derive(Debug, Default)]
pub struct MockStore {
    sessions: Mutex<Vec<SessionRecord>>,
    tasks: Mutex<Vec<Task>>,
    fail_record: AtomicBool,
    fail_stats: AtomicBool,
    fail_tasks: AtomicBool,
    stats_calls: AtomicUsize,
    task_calls: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with tasks.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::default();
        *lock(&store.tasks) = tasks;
        store
    }

    /// Makes `record_session` fail.
    pub fn fail_record(&self, fail: bool) {
        self.fail_record.store(fail, Ordering::SeqCst);
    }

    /// Makes `fetch_stats` fail.
    pub fn fail_stats(&self, fail: bool) {
        self.fail_stats.store(fail, Ordering::SeqCst);
    }

    /// Makes task lookups fail.
    pub fn fail_tasks(&self, fail: bool) {
        self.fail_tasks.store(fail, Ordering::SeqCst);
    }

    /// Returns the recorded sessions.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        lock(&self.sessions).clone()
    }

    /// Number of successfully recorded sessions.
    pub fn session_count(&self) -> usize {
        lock(&self.sessions).len()
    }

    /// Number of `fetch_stats` calls, including failed ones.
    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    /// Number of task lookups, including failed ones.
    pub fn task_calls(&self) -> usize {
        self.task_calls.load(Ordering::SeqCst)
    }

    /// Renames a task in place.
    pub fn rename_task(&self, id: TaskId, name: &str) {
        if let Some(task) = lock(&self.tasks).iter_mut().find(|t| t.id == id) {
            task.name = name.to_string();
        }
    }

    /// Removes a task.
    pub fn remove_task(&self, id: TaskId) {
        lock(&self.tasks).retain(|t| t.id != id);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl SessionStore for MockStore {
    async fn record_session(&self, record: &SessionRecord) -> Result<(), ApiError> {
        if self.fail_record.load(Ordering::SeqCst) {
            return Err(ApiError::Unavailable("session store unavailable".into()));
        }
        lock(&self.sessions).push(record.clone());
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<Stats, ApiError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(ApiError::Unavailable("stats unavailable".into()));
        }
        let sessions = lock(&self.sessions);
        Ok(Stats {
            total_pomodoros: sessions.len() as u64,
            total_minutes: sessions.iter().map(|s| u64::from(s.work_minutes)).sum(),
        })
    }
}

#[async_trait]
impl TaskStore for MockStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.task_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_tasks.load(Ordering::SeqCst) {
            return Err(ApiError::Unavailable("task store unavailable".into()));
        }
        Ok(lock(&self.tasks).clone())
    }
}
