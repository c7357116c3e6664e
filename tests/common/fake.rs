//! Scripted in-memory connector at the trait seam, for scheduler-level
//! tests that need controlled timing and failure scripts without sockets.

use std::collections::HashMap;
use std::io::Read;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ftpdl::connection::{Connector, RemoteClient};
use ftpdl::retry::TransferError;

/// Shared observations across all connections of one connector.
#[derive(Default)]
pub struct FakeStats {
    pub connects: AtomicU32,
    /// Connections currently open.
    pub active: AtomicUsize,
    /// Highest number of simultaneously open connections ever seen.
    pub high_water: AtomicUsize,
    /// RETR paths in the order the workers issued them.
    pub retr_order: Mutex<Vec<String>>,
}

/// In-memory remote filesystem with per-chunk latency and an optional
/// connect-failure budget.
pub struct FakeConnector {
    files: HashMap<String, Vec<u8>>,
    /// Sleep per data-channel read, to keep transfers observably in flight.
    pub chunk_delay: Duration,
    /// Fail this many connect() calls before the first success.
    pub fail_connects: AtomicU32,
    pub stats: Arc<FakeStats>,
}

impl FakeConnector {
    pub fn new(files: HashMap<String, Vec<u8>>) -> Self {
        Self {
            files,
            chunk_delay: Duration::ZERO,
            fail_connects: AtomicU32::new(0),
            stats: Arc::new(FakeStats::default()),
        }
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }
}

impl Connector for FakeConnector {
    fn connect(&self) -> Result<Box<dyn RemoteClient>, TransferError> {
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        if self
            .fail_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(TransferError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "scripted connect failure",
            )));
        }
        let now = self.stats.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.high_water.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(FakeClient {
            files: self.files.clone(),
            offset: 0,
            chunk_delay: self.chunk_delay,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct FakeClient {
    files: HashMap<String, Vec<u8>>,
    offset: u64,
    chunk_delay: Duration,
    stats: Arc<FakeStats>,
}

impl Drop for FakeClient {
    fn drop(&mut self) {
        self.stats.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RemoteClient for FakeClient {
    fn working_dir(&mut self) -> Result<String, TransferError> {
        Ok("/".to_string())
    }

    fn size(&mut self, path: &str) -> Result<Option<u64>, TransferError> {
        Ok(self.files.get(path).map(|body| body.len() as u64))
    }

    fn restart_from(&mut self, offset: u64) -> Result<(), TransferError> {
        self.offset = offset;
        Ok(())
    }

    fn retrieve(&mut self, path: &str) -> Result<Box<dyn Read + Send>, TransferError> {
        self.stats.retr_order.lock().unwrap().push(path.to_string());
        let body = self.files.get(path).cloned().unwrap_or_default();
        let start = (self.offset as usize).min(body.len());
        self.offset = 0;
        Ok(Box::new(SlowReader {
            data: body[start..].to_vec(),
            pos: 0,
            chunk_delay: self.chunk_delay,
        }))
    }

    fn finish_retrieve(&mut self, _data: Box<dyn Read + Send>) -> Result<(), TransferError> {
        Ok(())
    }

    fn close(self: Box<Self>) {}
}

struct SlowReader {
    data: Vec<u8>,
    pos: usize,
    chunk_delay: Duration,
}

impl Read for SlowReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        if !self.chunk_delay.is_zero() {
            std::thread::sleep(self.chunk_delay);
        }
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
