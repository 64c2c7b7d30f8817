use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;

use crate::error::PersistenceError;
use super::record::{AuditRecord, AUDIT_HEADER};

/// Append-only CSV audit log.
///
/// The file is opened per append and never held open across requests. An
/// exclusive `flock` on the open file covers header detection, the write and
/// the sync, so loggers in other threads, instances or processes never both
/// see an empty file. The mutex only guards this instance's header state.
/// Each append is a single `write_all` of a fully encoded buffer; a failed
/// write is cut back off the file.
pub struct AuditLog {
    path: PathBuf,
    /// Set once the on-disk header has been written or verified
    header_verified: Mutex<bool>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header_verified: Mutex::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first if the file is new.
    /// Returns only after the data reached the storage medium.
    pub fn append(&self, record: &AuditRecord) -> Result<(), PersistenceError> {
        let mut header_verified = self.header_verified.lock();

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        // Released when `file` is closed
        FileExt::lock_exclusive(&file)?;

        let start_len = file.metadata()?.len();
        let write_header = start_len == 0;
        if !write_header && !*header_verified {
            verify_header(&self.path)?;
        }

        let mut writer = csv_writer();
        if write_header {
            writer.write_record(AUDIT_HEADER)?;
        }
        writer.write_record(record.to_row())?;
        let row = writer
            .into_inner()
            .map_err(|e| PersistenceError::Io(e.into_error()))?;

        let mut buf = Vec::with_capacity(row.len() + 2);
        if !write_header && !ends_with_newline(&mut file, start_len)? {
            log::warn!(
                "Audit log {} ends with a partial row, terminating it",
                self.path.display()
            );
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(&row);

        let written = file.write_all(&buf).and_then(|()| file.sync_data());
        rollback_on_error(&file, start_len, written)?;
        *header_verified = true;

        if write_header {
            log::info!("Created audit log {}", self.path.display());
        }
        Ok(())
    }

    /// Run `f` while no append from this instance can interleave
    pub(super) fn with_lock<T>(&self, f: impl FnOnce(&Path) -> T) -> T {
        let _guard = self.header_verified.lock();
        f(&self.path)
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").field("path", &self.path).finish()
    }
}

/// In-memory encoder matching the deployed log format: minimal quoting, CRLF rows
fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new())
}

fn ends_with_newline(file: &mut File, len: u64) -> io::Result<bool> {
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Cut a failed write back to `start_len` so no fragment is left for the
/// next row to land on
fn rollback_on_error(file: &File, start_len: u64, result: io::Result<()>) -> io::Result<()> {
    if result.is_err() {
        if let Err(e) = file.set_len(start_len) {
            log::error!("Failed to roll back partial audit write: {}", e);
        }
    }
    result
}

/// The first row of an existing log must be exactly the schema header
fn verify_header(path: &Path) -> Result<(), PersistenceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(File::open(path)?);

    let mut first = csv::StringRecord::new();
    let found: Vec<String> = if reader.read_record(&mut first)? {
        first.iter().map(str::to_string).collect()
    } else {
        Vec::new()
    };

    if found.iter().map(String::as_str).ne(AUDIT_HEADER.iter().copied()) {
        log::error!("Audit log {} has an unexpected header", path.display());
        return Err(PersistenceError::SchemaMismatch { found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_failed_write_is_cut_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prediction_log.csv");
        std::fs::write(&path, "header\r\n").unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"half a ro").unwrap();
        let failed = Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));

        assert!(rollback_on_error(&file, 8, failed).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "header\r\n");
    }

    #[test]
    fn test_successful_write_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prediction_log.csv");
        std::fs::write(&path, "header\r\nrow\r\n").unwrap();

        let file = File::open(&path).unwrap();
        rollback_on_error(&file, 8, Ok(())).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "header\r\nrow\r\n");
    }
}
