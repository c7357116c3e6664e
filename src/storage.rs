//! Local-file side of a transfer attempt: size inspection and positioning.
//!
//! Every failure here is `TransferError::Storage` — a distinct class from
//! network errors that is never retried.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::retry::TransferError;

/// Size of the local file at `path`, or None if it does not exist.
pub fn local_size(path: &Path) -> Result<Option<u64>, TransferError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TransferError::Storage(e)),
    }
}

/// Open the local file positioned for `offset`: append when resuming past 0,
/// create/truncate otherwise (which also handles corrupt-resume recovery —
/// an oversized local file restarts from zero). Parent directories are
/// created as needed.
pub fn open_at_offset(path: &Path, offset: u64) -> Result<File, TransferError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(TransferError::Storage)?;
        }
    }
    let result = if offset > 0 {
        OpenOptions::new().append(true).open(path)
    } else {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
    };
    result.map_err(TransferError::Storage)
}

/// Append one received chunk.
pub fn append_chunk(file: &mut File, chunk: &[u8]) -> Result<(), TransferError> {
    file.write_all(chunk).map_err(TransferError::Storage)
}
