//! Task records, state machine, and the shared task collection.

mod store;
mod types;

pub use store::{PauseAction, StateError, TaskStore};
pub use types::{Task, TaskId, TaskState};
