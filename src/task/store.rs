//! Shared task collection: the single synchronization point between the
//! scheduler's workers and the caller.
//!
//! All mutation goes through methods here, under one lock; readers take
//! snapshots. FIFO admission order = smallest queued id.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Instant;

use super::types::{Task, TaskId, TaskState};

/// Error for caller-driven transitions: unknown id or wrong current state.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("unknown task id {0}")]
    UnknownTask(TaskId),
    #[error("task {id} is {actual} but must be {required}")]
    InvalidState {
        id: TaskId,
        actual: TaskState,
        required: &'static str,
    },
}

/// Outcome of a pause request; a Running task needs its cancel token set
/// by the caller, a Queued one is parked directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseAction {
    Parked,
    SignalWorker,
}

#[derive(Default)]
struct Inner {
    next_id: TaskId,
    tasks: BTreeMap<TaskId, Task>,
}

/// Lock-protected task collection. Cheap to share via `Arc`.
#[derive(Default)]
pub struct TaskStore {
    inner: RwLock<Inner>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new task in Queued state. `expected_size` seeds `total_size`
    /// so the idempotent short-circuit can run without touching the network.
    pub fn enqueue(
        &self,
        remote_path: impl Into<String>,
        local_path: impl Into<PathBuf>,
        expected_size: Option<u64>,
    ) -> TaskId {
        let mut inner = self.inner.write().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.tasks.insert(
            id,
            Task {
                id,
                remote_path: remote_path.into(),
                local_path: local_path.into(),
                total_size: expected_size,
                bytes_transferred: 0,
                state: TaskState::Queued,
                speed_bps: 0.0,
                error: None,
                started_at: None,
            },
        );
        id
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.inner.read().unwrap().tasks.get(&id).cloned()
    }

    /// Consistent point-in-time view of all tasks, in id order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.inner.read().unwrap().tasks.values().cloned().collect()
    }

    pub fn running_count(&self) -> usize {
        self.inner
            .read()
            .unwrap()
            .tasks
            .values()
            .filter(|t| t.state == TaskState::Running)
            .count()
    }

    /// Claim the earliest-queued task (FIFO): transitions it to Running and
    /// returns its id, or None when nothing is admissible.
    pub fn claim_next_queued(&self) -> Option<TaskId> {
        let mut inner = self.inner.write().unwrap();
        let id = inner
            .tasks
            .values()
            .find(|t| t.state == TaskState::Queued)
            .map(|t| t.id)?;
        let task = inner.tasks.get_mut(&id).expect("claimed id exists");
        task.state = TaskState::Running;
        task.speed_bps = 0.0;
        task.started_at = Some(Instant::now());
        Some(id)
    }

    /// Record the start of one attempt: resume offset becomes the byte
    /// counter, and a size discovered on this attempt is remembered.
    pub fn begin_attempt(&self, id: TaskId, total_size: Option<u64>, offset: u64) {
        let mut inner = self.inner.write().unwrap();
        if let Some(task) = inner.tasks.get_mut(&id) {
            if total_size.is_some() {
                task.total_size = total_size;
            }
            task.bytes_transferred = offset;
            task.speed_bps = 0.0;
            task.started_at = Some(Instant::now());
        }
    }

    /// Publish progress from the worker owning the task. The byte counter is
    /// clamped to the known total so the invariant
    /// `bytes_transferred <= total_size` holds even against a misbehaving server.
    pub fn record_progress(&self, id: TaskId, bytes_transferred: u64, speed_bps: f64) {
        let mut inner = self.inner.write().unwrap();
        if let Some(task) = inner.tasks.get_mut(&id) {
            task.bytes_transferred = match task.total_size {
                Some(total) => bytes_transferred.min(total),
                None => bytes_transferred,
            };
            task.speed_bps = speed_bps;
        }
    }

    pub fn mark_completed(&self, id: TaskId) {
        let mut inner = self.inner.write().unwrap();
        if let Some(task) = inner.tasks.get_mut(&id) {
            if let Some(total) = task.total_size {
                task.bytes_transferred = total;
            }
            task.state = TaskState::Completed;
            task.error = None;
        }
    }

    /// Park a cancelled task; partial progress is preserved for later resume.
    pub fn mark_paused(&self, id: TaskId) {
        let mut inner = self.inner.write().unwrap();
        if let Some(task) = inner.tasks.get_mut(&id) {
            task.state = TaskState::Paused;
            task.speed_bps = 0.0;
        }
    }

    /// Fail a task, keeping `bytes_transferred` from the last partial attempt
    /// so a later manual retry resumes instead of starting over.
    pub fn mark_failed(&self, id: TaskId, error: impl Into<String>) {
        let mut inner = self.inner.write().unwrap();
        if let Some(task) = inner.tasks.get_mut(&id) {
            task.state = TaskState::Failed;
            task.speed_bps = 0.0;
            task.error = Some(error.into());
        }
    }

    /// Caller pause request. Queued tasks are parked here; for Running tasks
    /// the caller must set the cancel token (the worker parks the task).
    pub fn pause(&self, id: TaskId) -> Result<PauseAction, StateError> {
        let mut inner = self.inner.write().unwrap();
        let task = inner.tasks.get_mut(&id).ok_or(StateError::UnknownTask(id))?;
        match task.state {
            TaskState::Queued => {
                task.state = TaskState::Paused;
                Ok(PauseAction::Parked)
            }
            TaskState::Running => Ok(PauseAction::SignalWorker),
            actual => Err(StateError::InvalidState {
                id,
                actual,
                required: "queued or running",
            }),
        }
    }

    /// Paused → Queued (explicit resume).
    pub fn resume(&self, id: TaskId) -> Result<(), StateError> {
        self.requeue(id, TaskState::Paused, "paused")
    }

    /// Failed → Queued (explicit retry); clears the error.
    pub fn retry(&self, id: TaskId) -> Result<(), StateError> {
        self.requeue(id, TaskState::Failed, "failed")
    }

    fn requeue(&self, id: TaskId, from: TaskState, required: &'static str) -> Result<(), StateError> {
        let mut inner = self.inner.write().unwrap();
        let task = inner.tasks.get_mut(&id).ok_or(StateError::UnknownTask(id))?;
        if task.state != from {
            return Err(StateError::InvalidState {
                id,
                actual: task.state,
                required,
            });
        }
        task.state = TaskState::Queued;
        task.error = None;
        task.speed_bps = 0.0;
        task.started_at = None;
        Ok(())
    }

    /// Remove a task from the collection. The engine never drops tasks on its
    /// own; this is the explicit caller action.
    pub fn remove(&self, id: TaskId) -> Option<Task> {
        self.inner.write().unwrap().tasks.remove(&id)
    }
}
