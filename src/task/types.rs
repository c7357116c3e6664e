//! Types for transfer tasks.

use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

/// Task identifier, allocated monotonically by the store.
pub type TaskId = u64;

/// Task state machine: `Queued → Running → {Completed | Failed | Paused}`,
/// `Paused → Queued` (explicit resume), `Failed → Queued` (explicit retry).
/// `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Queued,
    Running,
    Paused,
    Completed,
    Failed,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Running => "running",
            TaskState::Paused => "paused",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        }
    }

    /// True for states the scheduler will never pick up again on its own.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested file transfer and its current progress.
///
/// Mutated only through `TaskStore`; external readers get clones via
/// `snapshot`, so a `Task` value in caller hands is always a consistent
/// point-in-time view.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    /// Path on the remote server, as given to enqueue.
    pub remote_path: String,
    /// Destination on the local filesystem.
    pub local_path: PathBuf,
    /// Remote file size; None until queried, or when the server cannot tell.
    pub total_size: Option<u64>,
    /// Bytes present locally, including bytes from earlier attempts.
    pub bytes_transferred: u64,
    pub state: TaskState,
    /// Instantaneous transfer rate of the current attempt, bytes/second.
    pub speed_bps: f64,
    /// Human-readable failure message; cleared on retry.
    pub error: Option<String>,
    /// Start of the current attempt; None while not running.
    pub started_at: Option<Instant>,
}

impl Task {
    /// Percent complete in [0, 100], or None when the total size is unknown.
    pub fn percent(&self) -> Option<f64> {
        crate::progress::percent(self.bytes_transferred, self.total_size)
    }
}
