//! Failure classification and bounded retry-and-reconnect.
//!
//! One place decides which failures burn a retry attempt (network, timeout,
//! short stream) and which fail the task immediately (local disk, remote
//! not-found), so the session and scheduler share a consistent policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_ftp_error, classify_reply};
pub use error::TransferError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_reconnect;
