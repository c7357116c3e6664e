//! suppaftp-backed implementation of the connection seam.

use std::io::Read;
use std::net::ToSocketAddrs;

use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Mode};

use crate::config::TransferMode;
use crate::retry::TransferError;

use super::{ConnectSpec, Connector, RemoteClient};

/// Connector for real FTP servers. Each `connect` performs the full attempt
/// preamble: TCP connect with timeout, login, binary type, data-channel mode.
#[derive(Debug, Clone)]
pub struct FtpConnector {
    spec: ConnectSpec,
}

impl FtpConnector {
    pub fn new(spec: ConnectSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &ConnectSpec {
        &self.spec
    }
}

impl Connector for FtpConnector {
    fn connect(&self) -> Result<Box<dyn RemoteClient>, TransferError> {
        let spec = &self.spec;
        let addr = (spec.host.as_str(), spec.port)
            .to_socket_addrs()
            .map_err(|e| TransferError::Ftp(FtpError::ConnectionError(e)))?
            .next()
            .ok_or_else(|| {
                TransferError::Ftp(FtpError::ConnectionError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no address found for {}", spec.host),
                )))
            })?;

        let mut stream = FtpStream::connect_timeout(addr, spec.timeout)?;
        // Read timeout so a dead control channel suspends one worker for at
        // most `timeout`, not forever.
        if let Err(e) = stream.get_ref().set_read_timeout(Some(spec.timeout)) {
            let _ = stream.quit();
            return Err(TransferError::Ftp(FtpError::ConnectionError(e)));
        }
        stream.login(&spec.username, &spec.password)?;
        stream.transfer_type(FileType::Binary)?;
        stream.set_mode(match spec.mode {
            TransferMode::Passive => Mode::Passive,
            TransferMode::Active => Mode::Active,
        });
        tracing::debug!(host = %spec.host, port = spec.port, "control channel established");
        Ok(Box::new(FtpClient { stream }))
    }
}

struct FtpClient {
    stream: FtpStream,
}

impl RemoteClient for FtpClient {
    fn working_dir(&mut self) -> Result<String, TransferError> {
        Ok(self.stream.pwd()?)
    }

    fn size(&mut self, path: &str) -> Result<Option<u64>, TransferError> {
        match self.stream.size(path) {
            Ok(n) => Ok(Some(n as u64)),
            // Server rejected SIZE (unsupported or refused for this path):
            // degrade to unknown rather than failing the attempt.
            Err(FtpError::UnexpectedResponse(resp)) => {
                tracing::debug!(path, status = ?resp.status, "SIZE not answered, size unknown");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn restart_from(&mut self, offset: u64) -> Result<(), TransferError> {
        Ok(self.stream.resume_transfer(offset as usize)?)
    }

    fn retrieve(&mut self, path: &str) -> Result<Box<dyn Read + Send>, TransferError> {
        let data = self.stream.retr_as_stream(path)?;
        Ok(Box::new(data))
    }

    fn finish_retrieve(&mut self, data: Box<dyn Read + Send>) -> Result<(), TransferError> {
        Ok(self.stream.finalize_retr_stream(data)?)
    }

    fn close(mut self: Box<Self>) {
        if let Err(e) = self.stream.quit() {
            tracing::debug!("QUIT failed: {}", e);
        }
    }
}
