//! One download attempt: resume-offset decision, chunked streaming, and the
//! completeness check.
//!
//! A session pairs one task with one freshly opened connection and is
//! discarded when the attempt ends. All remote I/O goes through the
//! connection seam, so the resume logic here never sees the wire protocol.

use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::connection::RemoteClient;
use crate::progress::ProgressTracker;
use crate::retry::TransferError;
use crate::storage;
use crate::task::{TaskId, TaskStore};

/// How one attempt ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Stream consumed and (when the size is known) byte counts match.
    Completed,
    /// Local file already matched the remote size; no data was moved.
    AlreadyComplete,
    /// Cancel token observed; partial file preserved.
    Cancelled,
}

/// True when the bytes already on disk match a known total size. Used by the
/// worker to complete a task without opening any connection.
pub fn already_complete(local_path: &Path, total_size: Option<u64>) -> Result<bool, TransferError> {
    match total_size {
        Some(total) => Ok(storage::local_size(local_path)? == Some(total)),
        None => Ok(false),
    }
}

/// Execute one attempt for `id` over an open connection.
///
/// Steps: learn the total size (task-known or SIZE query), inspect the local
/// file, decide the resume offset (equal → done; larger → discard and
/// restart; else continue from local size), send the restart marker, then
/// stream chunks until EOF, checking the cancel token once per chunk and
/// publishing progress to the store.
pub fn run_attempt(
    client: &mut dyn RemoteClient,
    store: &TaskStore,
    id: TaskId,
    cancel: &AtomicBool,
    chunk_size: usize,
) -> Result<AttemptOutcome, TransferError> {
    let Some(task) = store.get(id) else {
        // task was cleared while we were connecting
        return Ok(AttemptOutcome::Cancelled);
    };
    if cancel.load(Ordering::Relaxed) {
        return Ok(AttemptOutcome::Cancelled);
    }

    let total_size = match task.total_size {
        Some(n) => Some(n),
        None => client.size(&task.remote_path)?,
    };
    let local = storage::local_size(&task.local_path)?;

    let offset = match (total_size, local) {
        (Some(total), Some(n)) if n == total => {
            tracing::debug!(task = id, total, "local file already complete");
            store.begin_attempt(id, total_size, total);
            return Ok(AttemptOutcome::AlreadyComplete);
        }
        (Some(total), Some(n)) if n > total => {
            tracing::warn!(
                task = id,
                local = n,
                total,
                "local file larger than remote, discarding and restarting"
            );
            0
        }
        (_, Some(n)) => n,
        (_, None) => 0,
    };

    store.begin_attempt(id, total_size, offset);
    let mut file = storage::open_at_offset(&task.local_path, offset)?;
    let mut tracker = ProgressTracker::new(offset, total_size);

    if offset > 0 {
        tracing::info!(task = id, offset, "resuming transfer");
        client.restart_from(offset)?;
    }

    let mut data = client.retrieve(&task.remote_path)?;
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!(task = id, "cancel requested, preserving partial file");
            return Ok(AttemptOutcome::Cancelled);
        }
        let n = data.read(&mut buf).map_err(TransferError::Io)?;
        if n == 0 {
            break;
        }
        storage::append_chunk(&mut file, &buf[..n])?;
        let bytes = tracker.add(n);
        store.record_progress(id, bytes, tracker.speed_bps());
    }
    client.finish_retrieve(data)?;

    let received = tracker.bytes_transferred();
    if let Some(total) = total_size {
        if received != total {
            return Err(TransferError::Incomplete {
                expected: total,
                received,
            });
        }
    }
    tracing::debug!(task = id, received, "attempt streamed to completion");
    Ok(AttemptOutcome::Completed)
}
