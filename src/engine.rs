//! Caller-facing engine handle.
//!
//! Front ends (GUI, CLI, tests) talk to the engine exclusively through this
//! type: enqueue work, issue pause/resume/retry/cancel, and poll snapshots.
//! No callback mechanism is required of any collaborator.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::FtpdlConfig;
use crate::connection::Connector;
use crate::control::TransferControl;
use crate::scheduler;
use crate::task::{PauseAction, Task, TaskId, TaskStore};

/// Error returned for caller requests against unknown ids or tasks in the
/// wrong state.
pub use crate::task::StateError as EngineError;

/// A running download engine. Dropping the handle detaches the scheduler;
/// use [`Engine::shutdown`] for an orderly stop.
pub struct Engine {
    store: Arc<TaskStore>,
    control: Arc<TransferControl>,
    scheduler: tokio::task::JoinHandle<()>,
}

impl Engine {
    /// Start the scheduler on the current tokio runtime. `connector` decides
    /// where transfers go; every attempt opens its own connection through it.
    pub fn start(connector: Arc<dyn Connector>, cfg: FtpdlConfig) -> Self {
        let store = Arc::new(TaskStore::new());
        let control = Arc::new(TransferControl::new());
        let scheduler = tokio::spawn(scheduler::run_scheduler(
            Arc::clone(&store),
            Arc::clone(&control),
            connector,
            cfg,
        ));
        Self {
            store,
            control,
            scheduler,
        }
    }

    /// Queue a transfer. `expected_size` (when the caller knows it, e.g. from
    /// a directory listing) enables the idempotent short-circuit and percent
    /// reporting before the first SIZE query.
    pub fn enqueue(
        &self,
        remote_path: impl Into<String>,
        local_path: impl Into<PathBuf>,
        expected_size: Option<u64>,
    ) -> TaskId {
        let remote_path = remote_path.into();
        let local_path = local_path.into();
        tracing::info!(remote = %remote_path, local = %local_path.display(), "task enqueued");
        self.store.enqueue(remote_path, local_path, expected_size)
    }

    /// Read-only view of every task, for display. Always a consistent
    /// point-in-time copy; polling this is the supported integration path.
    pub fn snapshot(&self) -> Vec<Task> {
        self.store.snapshot()
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.store.get(id)
    }

    /// Pause a queued or running task. Running transfers stop at the next
    /// chunk boundary and keep their partial file.
    pub fn pause(&self, id: TaskId) -> Result<(), EngineError> {
        match self.store.pause(id)? {
            PauseAction::Parked => Ok(()),
            PauseAction::SignalWorker => {
                self.control.request_abort(id);
                Ok(())
            }
        }
    }

    /// Re-queue a paused task; it resumes from the bytes already on disk.
    pub fn resume(&self, id: TaskId) -> Result<(), EngineError> {
        self.store.resume(id)
    }

    /// Re-queue a failed task, clearing its error. The retained partial
    /// progress means the new activation resumes, not restarts.
    pub fn retry(&self, id: TaskId) -> Result<(), EngineError> {
        self.store.retry(id)
    }

    /// Abort (if running) and remove a task. The engine never drops tasks on
    /// its own; this is the one destructive caller action.
    pub fn cancel(&self, id: TaskId) -> Result<(), EngineError> {
        self.control.request_abort(id);
        self.store
            .remove(id)
            .map(drop)
            .ok_or(EngineError::UnknownTask(id))
    }

    /// Request cancellation of all active transfers and stop admission.
    /// With `wait_for_drain`, returns once every worker has parked its task.
    /// Returns the final task snapshot.
    pub async fn shutdown(self, wait_for_drain: bool) -> Vec<Task> {
        self.control.request_shutdown();
        if wait_for_drain {
            if let Err(e) = self.scheduler.await {
                tracing::warn!("scheduler join failed: {}", e);
            }
        }
        self.store.snapshot()
    }
}
