//! The edit algebra (`engine`) and the File Service that orchestrates
//! `list` / `read` / `edit` against it (`service`).

pub mod engine;
pub mod error;
pub mod service;

pub use engine::{ApplyOutcome, EditOp, Operation};
pub use error::{Error, ErrorKind, Result};
pub use service::{
    EditResult, FileEntry, FileService, ListResult, RangeRequested, ReadResult, ServiceConfig,
};
