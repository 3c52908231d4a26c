//! Filesystem primitives for the text-file editing service: confined path
//! resolution (`path`), newline-aware I/O and atomic writes (`io`), and
//! per-file advisory locking (`lock`).

pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use error::{Error, Result};
pub use io::{DirEntryInfo, FileStat, NewlineStyle, RobustnessConfig};
pub use lock::{LockHandle, LockManager};
pub use path::{validate_filename, WorkingRoot};
