//! Counting gate for simultaneous transfers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Bounds the number of concurrent worker contexts. Acquire returns an RAII
/// guard; dropping it (worker done, panic included) frees the slot.
#[derive(Debug)]
pub struct WorkerSlots {
    max: usize,
    in_use: AtomicUsize,
}

impl WorkerSlots {
    pub fn new(max: usize) -> Self {
        Self {
            max: max.max(1),
            in_use: AtomicUsize::new(0),
        }
    }

    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    /// Take one slot if any is free.
    pub fn try_acquire(self: &Arc<Self>) -> Option<SlotGuard> {
        let mut current = self.in_use.load(Ordering::Relaxed);
        loop {
            if current >= self.max {
                return None;
            }
            match self.in_use.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    return Some(SlotGuard {
                        slots: Arc::clone(self),
                    })
                }
                Err(actual) => current = actual,
            }
        }
    }
}

/// Releases its slot when dropped.
#[derive(Debug)]
pub struct SlotGuard {
    slots: Arc<WorkerSlots>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slots.in_use.fetch_sub(1, Ordering::Release);
    }
}
