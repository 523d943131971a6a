//! Storage error types
//!
//! Error codes:
//! - AFTERSCHOOL_STORAGE_IO_ERROR (ERROR severity)
//! - AFTERSCHOOL_STORAGE_WRITE_FAILED (ERROR severity)
//! - AFTERSCHOOL_STORAGE_READ_FAILED (ERROR severity)
//! - AFTERSCHOOL_STORAGE_DUPLICATE_KEY (ERROR severity)
//! - AFTERSCHOOL_STORAGE_INVALID_DOCUMENT (ERROR severity)
//! - AFTERSCHOOL_STORAGE_UNSUPPORTED_TARGET (ERROR severity)
//! - AFTERSCHOOL_STORAGE_INVALID_NAME (ERROR severity)
//! - AFTERSCHOOL_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, server continues
    Error,
    /// The process must terminate
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O or runtime failure
    StorageIoError,
    /// Document write failed
    StorageWriteFailed,
    /// Document read failed
    StorageReadFailed,
    /// A document with the same `_id` already exists
    DuplicateKey,
    /// Document is not a JSON object or carries an unusable `_id`
    InvalidDocument,
    /// Connection target scheme is not recognised
    UnsupportedTarget,
    /// Database or collection name unusable as a path component
    InvalidName,
    /// Record checksum failure or truncated log
    DataCorruption,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::StorageIoError => "AFTERSCHOOL_STORAGE_IO_ERROR",
            StorageErrorCode::StorageWriteFailed => "AFTERSCHOOL_STORAGE_WRITE_FAILED",
            StorageErrorCode::StorageReadFailed => "AFTERSCHOOL_STORAGE_READ_FAILED",
            StorageErrorCode::DuplicateKey => "AFTERSCHOOL_STORAGE_DUPLICATE_KEY",
            StorageErrorCode::InvalidDocument => "AFTERSCHOOL_STORAGE_INVALID_DOCUMENT",
            StorageErrorCode::UnsupportedTarget => "AFTERSCHOOL_STORAGE_UNSUPPORTED_TARGET",
            StorageErrorCode::InvalidName => "AFTERSCHOOL_STORAGE_INVALID_NAME",
            StorageErrorCode::DataCorruption => "AFTERSCHOOL_DATA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error type with context
#[derive(Debug)]
pub struct StorageError {
    /// Error code
    code: StorageErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl StorageError {
    fn new(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new storage I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StorageErrorCode::StorageIoError, message)
        }
    }

    /// Create an I/O error with no underlying `io::Error` (lock poisoning, task failure)
    pub fn io_error_no_source(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::StorageIoError, message)
    }

    /// Create a new storage write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StorageErrorCode::StorageWriteFailed, message)
        }
    }

    /// Create a new storage read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StorageErrorCode::StorageReadFailed, message)
        }
    }

    /// Create a duplicate key error for a collection
    pub fn duplicate_key(collection: &str, document_id: &str) -> Self {
        Self {
            details: Some(format!("document_id: {}", document_id)),
            ..Self::new(
                StorageErrorCode::DuplicateKey,
                format!("Duplicate _id in collection '{}'", collection),
            )
        }
    }

    /// Create an invalid document error
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::InvalidDocument, message)
    }

    /// Create an unsupported connection target error
    pub fn unsupported_target(target: &str) -> Self {
        Self::new(
            StorageErrorCode::UnsupportedTarget,
            format!("Unsupported storage target: '{}'", target),
        )
    }

    /// Create an invalid database/collection name error
    pub fn invalid_name(kind: &str, name: &str) -> Self {
        Self::new(
            StorageErrorCode::InvalidName,
            format!("Invalid {} name: '{}'", kind, name),
        )
    }

    /// Create a new data corruption error (FATAL)
    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::DataCorruption, message)
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            ..Self::new(StorageErrorCode::DataCorruption, reason)
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal (requires process termination)
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
