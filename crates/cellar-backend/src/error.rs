//! Error types for storage media.

use std::io;

use thiserror::Error;

/// Errors raised by a storage medium (register, secure register, file store).
#[derive(Debug, Error)]
pub enum BackendError {
    /// The requested entry does not exist.
    #[error("entry not found: {key}")]
    NotFound { key: String },

    /// I/O error from the file system.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The secure register refused access to this entry.
    #[error("access denied for {key}: {reason}")]
    AccessDenied { key: String, reason: String },

    /// The secure register is locked (e.g. device lock screen).
    #[error("secure register '{service}' is locked")]
    Locked { service: String },

    /// The medium only accepts reads.
    #[error("store is read-only")]
    ReadOnly,

    /// A filename or directory name would escape its directory or is empty.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A persisted register document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

impl BackendError {
    /// `true` when the error only says "there is nothing here".
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    pub(crate) fn not_found(key: &str) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }

    pub(crate) fn poisoned(e: impl std::fmt::Display) -> Self {
        Self::Poisoned(e.to_string())
    }
}

/// Result alias for storage media operations.
pub type BackendResult<T> = Result<T, BackendError>;
