use std::time::Duration;

use crate::config::RetryConfig;

/// High-level classification of an attempt failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect or read timed out.
    Timeout,
    /// Network-level failure (unreachable host, reset, auth rejected).
    Connection,
    /// Stream ended short of the expected byte count.
    Incomplete,
    /// Server says the remote path does not exist.
    NotFound,
    /// Local filesystem failure.
    Storage,
    /// Anything else (typically a permanent server rejection).
    Other,
}

impl ErrorKind {
    /// Transient failures are worth a reconnect; the rest fail the task
    /// immediately.
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::Connection | ErrorKind::Incomplete)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Disconnect, wait the given delay, reconnect, re-attempt.
    RetryAfter(Duration),
}

/// Bounded retry with a fixed reconnect delay.
///
/// The downloader this engine grew from waits a flat interval between
/// reconnects rather than backing off exponentially; the decide() shape
/// keeps the schedule swappable without touching call sites.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts per task activation (including the first).
    pub max_attempts: u32,
    /// Delay between disconnect and reconnect.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            delay: Duration::from_secs_f64(cfg.delay_secs.max(0.0)),
        }
    }

    /// Decide what to do after attempt number `attempt` (1-based) failed
    /// with `kind`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        if kind.is_transient() {
            RetryDecision::RetryAfter(self.delay)
        } else {
            RetryDecision::NoRetry
        }
    }
}
