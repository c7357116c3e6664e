//! Classify FTP reply codes and I/O failures into retry policy error kinds.

use suppaftp::{FtpError, Status};

use super::error::TransferError;
use super::policy::ErrorKind;

fn classify_io(e: &std::io::Error) -> ErrorKind {
    match e.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => ErrorKind::Timeout,
        _ => ErrorKind::Connection,
    }
}

/// Classify a server reply that failed a command.
pub fn classify_reply(status: Status) -> ErrorKind {
    match status {
        // transient server/channel trouble: reconnect and try again
        Status::NotAvailable
        | Status::CannotOpenDataConnection
        | Status::TransferAborted
        | Status::RequestFileActionIgnored
        | Status::ActionAborted => ErrorKind::Connection,
        // auth rejection is attempt-fatal but still a connection-class failure
        Status::NotLoggedIn => ErrorKind::Connection,
        Status::FileUnavailable | Status::BadFilename => ErrorKind::NotFound,
        _ => ErrorKind::Other,
    }
}

/// Classify a control- or data-channel error for retry decisions.
pub fn classify_ftp_error(e: &FtpError) -> ErrorKind {
    match e {
        FtpError::ConnectionError(io) => classify_io(io),
        FtpError::UnexpectedResponse(resp) => classify_reply(resp.status),
        // garbled reply: the channel is not trustworthy anymore
        FtpError::BadResponse => ErrorKind::Connection,
        _ => ErrorKind::Other,
    }
}

/// Classify a transfer attempt error into an ErrorKind.
pub fn classify(e: &TransferError) -> ErrorKind {
    match e {
        TransferError::Ftp(fe) => classify_ftp_error(fe),
        TransferError::Io(io) => classify_io(io),
        TransferError::Incomplete { .. } => ErrorKind::Incomplete,
        TransferError::Storage(_) => ErrorKind::Storage,
    }
}
