//! One worker context: owns a claimed task from admission to terminal state.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::connection::Connector;
use crate::control::TransferControl;
use crate::retry::{run_with_reconnect, RetryPolicy, TransferError};
use crate::session::{self, AttemptOutcome};
use crate::task::{TaskId, TaskStore};

/// Runs the full attempt cycle for one Running task and records its terminal
/// state. Never panics the caller over a single task's failure; every error
/// ends up as a message on the task.
pub fn run_task(
    store: &TaskStore,
    control: &TransferControl,
    connector: &dyn Connector,
    policy: &RetryPolicy,
    chunk_size: usize,
    id: TaskId,
) {
    let cancel = control.register(id);
    match execute(store, connector, policy, chunk_size, id, &cancel) {
        Ok(AttemptOutcome::Completed) | Ok(AttemptOutcome::AlreadyComplete) => {
            store.mark_completed(id);
            tracing::info!(task = id, "transfer completed");
        }
        Ok(AttemptOutcome::Cancelled) => {
            store.mark_paused(id);
            tracing::info!(task = id, "transfer paused");
        }
        Err(e) => {
            if cancel.load(Ordering::Relaxed) {
                // pause raced a failing attempt; the user's intent wins
                store.mark_paused(id);
            } else {
                tracing::warn!(task = id, "transfer failed: {}", e);
                store.mark_failed(id, e.to_string());
            }
        }
    }
    control.unregister(id);
}

fn execute(
    store: &TaskStore,
    connector: &dyn Connector,
    policy: &RetryPolicy,
    chunk_size: usize,
    id: TaskId,
    cancel: &AtomicBool,
) -> Result<AttemptOutcome, TransferError> {
    let Some(task) = store.get(id) else {
        return Ok(AttemptOutcome::Cancelled);
    };
    // Idempotent short-circuit: a local file that already matches a known
    // remote size completes without opening any connection.
    if session::already_complete(&task.local_path, task.total_size)? {
        return Ok(AttemptOutcome::AlreadyComplete);
    }
    run_with_reconnect(policy, connector, |client| {
        session::run_attempt(client, store, id, cancel, chunk_size)
    })
}
