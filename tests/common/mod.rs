#![allow(dead_code)]

pub mod fake;
pub mod ftp_server;

use std::time::Duration;

use ftpdl::config::{FtpdlConfig, RetryConfig};
use ftpdl::connection::ConnectSpec;

/// Engine config tuned for tests: tight polling, millisecond retry delay.
pub fn test_config(max_concurrent: usize) -> FtpdlConfig {
    FtpdlConfig {
        max_concurrent,
        chunk_size: 64,
        connect_timeout_secs: 5,
        poll_interval_ms: 10,
        retry: Some(RetryConfig {
            max_attempts: 3,
            delay_secs: 0.01,
        }),
        ..FtpdlConfig::default()
    }
}

/// Anonymous spec pointed at an in-process test server.
pub fn spec_for(server: &ftp_server::FtpServer) -> ConnectSpec {
    ConnectSpec::anonymous(server.host.clone(), server.port).configured(&test_config(1))
}

/// Polls `pred` every 10 ms until it holds; false on timeout.
pub async fn wait_until(timeout: Duration, mut pred: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if pred() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
