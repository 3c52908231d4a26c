//! Error types for edit-fs

use std::path::PathBuf;

/// Result type for edit-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in edit-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("invalid filename {name:?}: {reason}")]
    InvalidFilename { name: String, reason: String },

    #[error("path escapes working root: {path}")]
    PathTraversal { path: PathBuf },

    #[error("content at {path} is not valid UTF-8")]
    InvalidEncoding { path: PathBuf },

    #[error("lock acquisition timed out for {path}")]
    LockTimeout { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
