//! Collection log writer with fsync enforcement
//!
//! A write is not acknowledged until the record is on disk.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::LogRecord;

/// Append-only writer for one collection log.
pub struct LogWriter {
    path: PathBuf,
    file: File,
    current_offset: u64,
}

impl LogWriter {
    /// Opens or creates the log file at `path` for appending.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open collection log: {}", path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            current_offset,
        })
    }

    /// Appends a record and fsyncs. Returns the offset the record was written at.
    ///
    /// The log never keeps bytes past the last acknowledged record: a failed
    /// write is cut off, and a tail left by an earlier failure is cut off
    /// before the next append.
    pub fn append(&mut self, record: &LogRecord) -> StorageResult<u64> {
        self.discard_unacknowledged_tail()?;

        let serialized = record.serialize();
        let offset = self.current_offset;

        if let Err(e) = self.file.write_all(&serialized) {
            self.truncate_to_acknowledged();
            return Err(StorageError::write_failed(
                format!("Failed to write document: {}", record.document_id),
                e,
            ));
        }

        if let Err(e) = self.file.sync_all() {
            self.truncate_to_acknowledged();
            return Err(StorageError::write_failed(
                format!("fsync failed after writing document: {}", record.document_id),
                e,
            ));
        }

        self.current_offset += serialized.len() as u64;
        Ok(offset)
    }

    fn discard_unacknowledged_tail(&mut self) -> StorageResult<()> {
        let on_disk = self
            .file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read file metadata", e))?
            .len();

        if on_disk != self.current_offset {
            self.file
                .set_len(self.current_offset)
                .and_then(|_| self.file.sync_all())
                .map_err(|e| {
                    StorageError::write_failed(
                        format!(
                            "Failed to cut collection log back to {} bytes: {}",
                            self.current_offset,
                            self.path.display()
                        ),
                        e,
                    )
                })?;
        }
        Ok(())
    }

    /// Best effort; a failure here is retried by the next append.
    fn truncate_to_acknowledged(&mut self) {
        let _ = self.file.set_len(self.current_offset);
    }
}
