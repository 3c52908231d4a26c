//! Transport-level errors (malformed request bodies) plus the mapping
//! from `edit_core::Error` onto JSON-RPC codes and HTTP statuses. This is
//! the only place that distinguishes wire formats from the closed kind
//! set in `edit_core::ErrorKind`.

use edit_core::ErrorKind;
use serde_json::{json, Value};

use crate::protocol::{
    CODE_FILESYSTEM, CODE_INTERNAL_ERROR, CODE_INVALID_PARAMS, CODE_INVALID_REQUEST,
    CODE_LOCK_FAILED, CODE_METHOD_NOT_FOUND, CODE_PARSE_ERROR,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse request: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error(transparent)]
    Service(#[from] edit_core::Error),
}

impl Error {
    /// JSON-RPC error code for this error.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Error::Parse(_) => CODE_PARSE_ERROR,
            Error::InvalidRequest(_) => CODE_INVALID_REQUEST,
            Error::MethodNotFound(_) => CODE_METHOD_NOT_FOUND,
            Error::Service(e) => match e.kind() {
                ErrorKind::InvalidParams => CODE_INVALID_PARAMS,
                ErrorKind::NotFound
                | ErrorKind::PermissionDenied
                | ErrorKind::FileTooLarge
                | ErrorKind::InvalidEncoding
                | ErrorKind::FilesystemError => CODE_FILESYSTEM,
                ErrorKind::LockFailed => CODE_LOCK_FAILED,
                ErrorKind::InternalError => CODE_INTERNAL_ERROR,
            },
        }
    }

    /// HTTP status code for this error, per the transport mapping table.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Parse(_) | Error::InvalidRequest(_) => 400,
            Error::MethodNotFound(_) => 404,
            Error::Service(e) => match e.kind() {
                ErrorKind::InvalidParams => 400,
                ErrorKind::NotFound => 404,
                ErrorKind::PermissionDenied => 403,
                ErrorKind::FileTooLarge => 413,
                ErrorKind::LockFailed => 409,
                ErrorKind::InvalidEncoding
                | ErrorKind::FilesystemError
                | ErrorKind::InternalError => 500,
            },
        }
    }

    /// Structured payload rendered verbatim as `data`/the HTTP error body.
    /// Carries whatever detail fields the originating `edit_core::Error`
    /// variant holds (§4.6): `filename` always when present, plus
    /// `operation`/`line`/`total_lines` for an out-of-range edit or
    /// `max_size_mb` for an oversized file.
    pub fn data(&self) -> Option<Value> {
        match self {
            Error::Service(edit_core::Error::InvalidParams {
                filename,
                operation,
                line,
                total_lines,
                ..
            }) => Some(json!({
                "filename": filename,
                "operation": operation,
                "line": line,
                "total_lines": total_lines,
            })),
            Error::Service(edit_core::Error::FileTooLarge {
                filename,
                max_size_mb,
            }) => Some(json!({
                "filename": filename,
                "max_size_mb": max_size_mb,
            })),
            Error::Service(e) => Some(json!({ "filename": e.filename() })),
            _ => None,
        }
    }

    /// Logs each error once at the transport boundary: client-caused
    /// errors at `warn`, internal ones at `error`, per the error handling
    /// discipline.
    pub fn log(&self) {
        match self {
            Error::Service(e) => match e.kind() {
                ErrorKind::InternalError | ErrorKind::FilesystemError => {
                    tracing::error!(kind = ?e.kind(), filename = e.filename(), "request failed");
                }
                _ => {
                    tracing::warn!(kind = ?e.kind(), filename = e.filename(), "request failed");
                }
            },
            other => tracing::warn!(error = %other, "request failed"),
        }
    }
}
