//! Audit error types.

use std::path::PathBuf;

/// Errors that can occur during audit storage operations.
#[derive(thiserror::Error, Debug)]
pub enum AuditError {
    /// Failed to open or create database.
    #[error("Failed to open database at {path}: {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to execute SQL.
    #[error("Database query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Blocking task was cancelled.
    #[error("Blocking task cancelled")]
    TaskCancelled,

    /// Failed to create parent directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tried to finish a record that was never persisted.
    #[error("Record has no storage-assigned identifier")]
    Unpersisted,
}

impl AuditError {
    /// Whether retrying the operation could plausibly succeed.
    ///
    /// Records without an identifier stay unpersisted; retrying the update
    /// cannot help.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Unpersisted)
    }
}
