//! Transfer attempt error type for retry classification.

use std::fmt;

use suppaftp::FtpError;

/// Error from a single transfer attempt (control channel, data channel, or
/// local storage). Kept as a typed enum so we can classify and decide
/// retries before converting to anyhow at the engine boundary.
#[derive(Debug)]
pub enum TransferError {
    /// Control-channel failure: connect, auth, or an unexpected reply.
    Ftp(FtpError),
    /// Data-channel read failed mid-stream (connection reset, timeout).
    Io(std::io::Error),
    /// Stream ended cleanly but short of the expected byte count
    /// (e.g. server closed early). Enables retry instead of silent truncation.
    Incomplete { expected: u64, received: u64 },
    /// Local filesystem failure (disk full, permission denied). Not retried.
    Storage(std::io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Ftp(e) => write!(f, "{}", e),
            TransferError::Io(e) => write!(f, "data channel: {}", e),
            TransferError::Incomplete { expected, received } => {
                write!(f, "incomplete transfer: expected {} bytes, got {}", expected, received)
            }
            TransferError::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Ftp(e) => Some(e),
            TransferError::Io(e) | TransferError::Storage(e) => Some(e),
            TransferError::Incomplete { .. } => None,
        }
    }
}

impl From<FtpError> for TransferError {
    fn from(e: FtpError) -> Self {
        TransferError::Ftp(e)
    }
}
