//! Cooperative cancellation: per-task cancel tokens and global shutdown.
//!
//! Each running worker registers a token here; pause and cancel requests set
//! it, and the session loop checks it once per chunk. Shutdown flips every
//! registered token plus a global flag the admission loop watches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::task::TaskId;

/// Shared registry of task id -> cancel token, plus the engine-wide
/// shutdown flag.
#[derive(Default)]
pub struct TransferControl {
    tokens: RwLock<HashMap<TaskId, Arc<AtomicBool>>>,
    shutdown: AtomicBool,
}

impl TransferControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running task; returns the token the session loop polls.
    /// Tokens start cleared unless shutdown was already requested.
    pub fn register(&self, id: TaskId) -> Arc<AtomicBool> {
        let token = Arc::new(AtomicBool::new(self.shutdown_requested()));
        self.tokens.write().unwrap().insert(id, Arc::clone(&token));
        token
    }

    /// Unregister when the worker finishes, whatever the outcome.
    pub fn unregister(&self, id: TaskId) {
        self.tokens.write().unwrap().remove(&id);
    }

    /// Request cancellation of one running task. The worker sees the token at
    /// chunk granularity, preserves the partial file, and parks the task.
    pub fn request_abort(&self, id: TaskId) {
        if let Some(token) = self.tokens.read().unwrap().get(&id) {
            token.store(true, Ordering::Relaxed);
        }
    }

    /// Request cancellation of every active worker and stop future admission.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for token in self.tokens.read().unwrap().values() {
            token.store(true, Ordering::Relaxed);
        }
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}
