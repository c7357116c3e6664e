//! Progress math for one transfer attempt: percent, average rate, ETA.
//!
//! Rate is a simple average over the attempt (bytes since attempt start /
//! elapsed), recomputed on each chunk; consumers derive
//! ETA = (total - done) / rate when both are known.

use std::time::Instant;

/// Percent complete in [0, 100]; None when the total size is unknown
/// (progress is indeterminate, not zero).
pub fn percent(bytes_transferred: u64, total_size: Option<u64>) -> Option<f64> {
    let total = total_size?;
    if total == 0 {
        return Some(100.0);
    }
    Some((bytes_transferred as f64 / total as f64 * 100.0).min(100.0))
}

/// Tracks one attempt. `start_offset` is the resume offset, so the rate only
/// counts bytes this attempt actually moved over the wire.
#[derive(Debug)]
pub struct ProgressTracker {
    started: Instant,
    start_offset: u64,
    bytes_transferred: u64,
    total_size: Option<u64>,
}

impl ProgressTracker {
    pub fn new(start_offset: u64, total_size: Option<u64>) -> Self {
        Self {
            started: Instant::now(),
            start_offset,
            bytes_transferred: start_offset,
            total_size,
        }
    }

    /// Record one received chunk; returns the updated absolute byte count.
    pub fn add(&mut self, chunk_len: usize) -> u64 {
        self.bytes_transferred += chunk_len as u64;
        self.bytes_transferred
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    /// Average rate over this attempt in bytes/second (0 while no time has passed).
    pub fn speed_bps(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.bytes_transferred - self.start_offset) as f64 / elapsed
    }

    pub fn percent(&self) -> Option<f64> {
        percent(self.bytes_transferred, self.total_size)
    }

    /// Estimated seconds remaining; None when rate is 0 or total unknown.
    pub fn eta_secs(&self) -> Option<f64> {
        let total = self.total_size?;
        let remaining = total.saturating_sub(self.bytes_transferred);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.speed_bps();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }
}

/// Human-readable byte count ("1.5 MiB") for front ends rendering snapshots.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return if unit == "B" {
                format!("{} {}", bytes, unit)
            } else {
                format!("{:.1} {}", value, unit)
            };
        }
        value /= 1024.0;
    }
    format!("{:.1} PiB", value)
}

/// Human-readable ETA ("45s", "3m 20s", "1h 5m").
pub fn format_eta(secs: f64) -> String {
    let secs = secs.max(0.0).round() as u64;
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
