//! Collection log reader with strict corruption detection
//!
//! Used on connect to replay a collection. Any checksum failure or
//! truncated record is reported as data corruption.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::LogRecord;

/// Sequential reader over a collection log held in memory.
pub struct LogReader {
    path: PathBuf,
    data: Vec<u8>,
    current_offset: usize,
}

impl LogReader {
    /// Reads the whole log file.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let data = fs::read(path).map_err(|e| {
            StorageError::read_failed(
                format!("Failed to read collection log: {}", path.display()),
                e,
            )
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            data,
            current_offset: 0,
        })
    }

    /// Byte offset of the next record.
    pub fn current_offset(&self) -> u64 {
        self.current_offset as u64
    }

    /// Reads the next record. `Ok(None)` at a clean end of file.
    pub fn read_next(&mut self) -> StorageResult<Option<LogRecord>> {
        let remaining = &self.data[self.current_offset..];
        if remaining.is_empty() {
            return Ok(None);
        }

        let (record, consumed) = LogRecord::deserialize(remaining).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset as u64,
                format!("{} in {}", e, self.path.display()),
            )
        })?;

        self.current_offset += consumed;
        Ok(Some(record))
    }
}
