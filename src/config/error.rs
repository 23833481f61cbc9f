use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving command snapshots.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Snapshot file does not exist.
    #[error("Snapshot file not found: {0}")]
    NotFound(PathBuf),
    /// Backup directory cannot be created or written to.
    #[error("Backup directory not writable: {0}")]
    BackupDirNotWritable(PathBuf),
    /// Failed to create backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Snapshot did not pass validation.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    /// Snapshot document written by a newer format.
    #[error("Unsupported snapshot format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    /// Snapshot or settings document is not valid JSON of the expected shape.
    #[error("Invalid document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Serialising a snapshot failed.
    #[error("Failed to serialise snapshot: {0}")]
    Serialise(#[from] serde_json::Error),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
