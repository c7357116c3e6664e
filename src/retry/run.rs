//! Attempt loop: fresh connection per attempt, fixed delay between attempts.
//!
//! Connections are deliberately not reused across retries; a clean
//! disconnect/reconnect sidesteps stale protocol state on the control
//! channel at the cost of one round-trip per retry.

use crate::connection::{Connector, RemoteClient};

use super::classify::classify;
use super::error::TransferError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `attempt` with a connection opened for it, until it succeeds or the
/// policy says stop. On a retryable failure the connection is already closed
/// (each attempt owns its own); we wait out the delay and reconnect.
pub fn run_with_reconnect<T, F>(
    policy: &RetryPolicy,
    connector: &dyn Connector,
    mut attempt: F,
) -> Result<T, TransferError>
where
    F: FnMut(&mut dyn RemoteClient) -> Result<T, TransferError>,
{
    let mut attempt_no = 1u32;
    loop {
        let result = match connector.connect() {
            Ok(mut client) => {
                let r = attempt(client.as_mut());
                client.close();
                r
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(value) => return Ok(value),
            Err(e) => {
                let kind = classify(&e);
                match policy.decide(attempt_no, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(delay) => {
                        tracing::warn!(
                            attempt = attempt_no,
                            "attempt failed ({}), reconnecting in {:?}",
                            e,
                            delay
                        );
                        std::thread::sleep(delay);
                        attempt_no += 1;
                    }
                }
            }
        }
    }
}
