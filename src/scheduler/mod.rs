//! Bounded-concurrency task scheduler.
//!
//! Holds nothing itself: state lives in `TaskStore` (the shared collection)
//! and `TransferControl` (cancel tokens); the admission loop here wires them
//! to worker contexts, at most `max_concurrent` at a time, FIFO.

mod run;
mod slots;
mod worker;

pub use run::run_scheduler;
pub use slots::{SlotGuard, WorkerSlots};
