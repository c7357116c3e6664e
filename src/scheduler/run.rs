//! Admission loop: claim queued tasks FIFO into bounded blocking workers.
//!
//! Work-search is non-blocking with a short idle sleep between polls — a
//! bounded-latency simplification over an event-driven wake. Each admitted
//! task gets an independent worker on the blocking pool, so a stalled
//! transfer never holds back the others.

use std::sync::Arc;

use crate::config::FtpdlConfig;
use crate::connection::Connector;
use crate::control::TransferControl;
use crate::retry::RetryPolicy;
use crate::task::TaskStore;

use super::slots::WorkerSlots;
use super::worker;

/// Runs until shutdown is requested, then waits for active workers to park
/// their tasks. Spawn this once per engine with `tokio::spawn`.
pub async fn run_scheduler(
    store: Arc<TaskStore>,
    control: Arc<TransferControl>,
    connector: Arc<dyn Connector>,
    cfg: FtpdlConfig,
) {
    let slots = Arc::new(WorkerSlots::new(cfg.max_concurrent));
    let policy = cfg
        .retry
        .as_ref()
        .map(RetryPolicy::from_config)
        .unwrap_or_default();
    let poll_interval = cfg.poll_interval();
    let chunk_size = cfg.chunk_size;
    let mut workers: Vec<tokio::task::JoinHandle<()>> = Vec::new();

    tracing::debug!(
        max_concurrent = cfg.max_concurrent,
        chunk_size,
        "scheduler started"
    );

    while !control.shutdown_requested() {
        while let Some(slot) = slots.try_acquire() {
            let Some(id) = store.claim_next_queued() else {
                break; // slot guard drops here, nothing was admissible
            };
            tracing::debug!(task = id, "admitted");
            let store = Arc::clone(&store);
            let control = Arc::clone(&control);
            let connector = Arc::clone(&connector);
            workers.push(tokio::task::spawn_blocking(move || {
                let _slot = slot;
                worker::run_task(&store, &control, connector.as_ref(), &policy, chunk_size, id);
            }));
        }
        workers.retain(|handle| !handle.is_finished());
        tokio::time::sleep(poll_interval).await;
    }

    // Shutdown flips every cancel token; workers observe them at chunk
    // granularity and park their tasks as Paused.
    for handle in workers {
        if let Err(e) = handle.await {
            tracing::warn!("worker join failed: {}", e);
        }
    }
    tracing::debug!("scheduler drained");
}
