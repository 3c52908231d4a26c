//! The service-layer error enum. Its variants are the closed kind set
//! transports map to wire formats; lower-layer errors fold into it here
//! rather than being re-derived at the transport boundary.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameters: {message}")]
    InvalidParams {
        message: String,
        filename: Option<String>,
        operation: Option<String>,
        line: Option<usize>,
        total_lines: Option<usize>,
    },

    #[error("not found: {filename}")]
    NotFound { filename: String },

    #[error("permission denied: {filename}")]
    PermissionDenied { filename: String },

    #[error("file too large: {filename} exceeds {max_size_mb} MiB")]
    FileTooLarge { filename: String, max_size_mb: u64 },

    #[error("invalid encoding: {filename} is not valid UTF-8")]
    InvalidEncoding { filename: String },

    #[error("lock failed for {filename}")]
    LockFailed { filename: String },

    #[error("filesystem error: {message}")]
    FilesystemError { message: String, filename: Option<String> },

    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl Error {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
            filename: None,
            operation: None,
            line: None,
            total_lines: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        let name = filename.into();
        match &mut self {
            Error::InvalidParams { filename, .. } => *filename = Some(name),
            Error::NotFound { filename } => *filename = name,
            Error::PermissionDenied { filename } => *filename = name,
            Error::FileTooLarge { filename, .. } => *filename = name,
            Error::InvalidEncoding { filename } => *filename = name,
            Error::LockFailed { filename } => *filename = name,
            Error::FilesystemError { filename, .. } => *filename = Some(name),
            Error::InternalError { .. } => {}
        }
        self
    }

    /// Map a lower-layer filesystem error onto the closed service kind set,
    /// attaching the caller-supplied (not resolved) filename.
    pub fn from_fs(err: edit_fs::Error, filename: &str) -> Self {
        match err {
            edit_fs::Error::NotFound { .. } => Error::NotFound {
                filename: filename.to_string(),
            },
            edit_fs::Error::PermissionDenied { .. } => Error::PermissionDenied {
                filename: filename.to_string(),
            },
            edit_fs::Error::InvalidFilename { reason, .. } => Error::invalid_params(reason)
                .with_filename(filename),
            edit_fs::Error::PathTraversal { .. } => {
                Error::invalid_params("path escapes the working directory").with_filename(filename)
            }
            edit_fs::Error::InvalidEncoding { .. } => Error::InvalidEncoding {
                filename: filename.to_string(),
            },
            edit_fs::Error::LockTimeout { .. } => Error::LockFailed {
                filename: filename.to_string(),
            },
            edit_fs::Error::NotADirectory { .. } => Error::FilesystemError {
                message: err.to_string(),
                filename: Some(filename.to_string()),
            },
            edit_fs::Error::Io { .. } => Error::FilesystemError {
                message: err.to_string(),
                filename: Some(filename.to_string()),
            },
        }
    }

    /// The closed kind tag, used by transports to pick a status/code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParams { .. } => ErrorKind::InvalidParams,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Error::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Error::InvalidEncoding { .. } => ErrorKind::InvalidEncoding,
            Error::LockFailed { .. } => ErrorKind::LockFailed,
            Error::FilesystemError { .. } => ErrorKind::FilesystemError,
            Error::InternalError { .. } => ErrorKind::InternalError,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            Error::InvalidParams { filename, .. } => filename.as_deref(),
            Error::NotFound { filename } => Some(filename),
            Error::PermissionDenied { filename } => Some(filename),
            Error::FileTooLarge { filename, .. } => Some(filename),
            Error::InvalidEncoding { filename } => Some(filename),
            Error::LockFailed { filename } => Some(filename),
            Error::FilesystemError { filename, .. } => filename.as_deref(),
            Error::InternalError { .. } => None,
        }
    }
}

/// The closed error kind set transports and logging key off of. Distinct
/// from `Error` itself so transport code can match on it without pulling
/// apart every variant's payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParams,
    NotFound,
    PermissionDenied,
    FileTooLarge,
    InvalidEncoding,
    LockFailed,
    FilesystemError,
    InternalError,
}
