//! Newline-aware, UTF-8-checked I/O plus the atomic write primitive.
//!
//! This module is the only place in the workspace allowed to call into
//! `std::fs` directly; everything above it goes through these functions so
//! that path confinement and line splitting stay centrally testable.

use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Robustness knobs for `write_atomic`'s retry behavior.
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// Call `File::sync_all` before renaming. Disable only if durability
    /// on power loss is an acceptable trade for latency.
    pub enable_fsync: bool,
    /// Upper bound on time spent retrying a transient rename/write failure.
    pub max_retry_elapsed: Duration,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            enable_fsync: true,
            max_retry_elapsed: Duration::from_secs(5),
        }
    }
}

/// Metadata returned by `stat`.
#[derive(Debug, Clone)]
pub struct FileStat {
    pub size: u64,
    pub is_dir: bool,
    pub mtime: DateTime<Utc>,
    pub mode: u32,
}

/// One entry from `list_dir`.
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
    pub is_hidden: bool,
    pub size: u64,
    pub mtime: DateTime<Utc>,
    pub mode: u32,
}

/// The terminator a file was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewlineStyle {
    Lf,
    CrLf,
    Cr,
}

impl NewlineStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            NewlineStyle::Lf => "\n",
            NewlineStyle::CrLf => "\r\n",
            NewlineStyle::Cr => "\r",
        }
    }
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| classify_io(path, e))
}

pub fn exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(classify_io(path, e)),
    }
}

pub fn stat(path: &Path) -> Result<FileStat> {
    let metadata = fs::metadata(path).map_err(|e| classify_io(path, e))?;
    Ok(FileStat {
        size: metadata.len(),
        is_dir: metadata.is_dir(),
        mtime: metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now()),
        mode: file_mode(&metadata),
    })
}

pub fn list_dir(path: &Path) -> Result<Vec<DirEntryInfo>> {
    let read_dir = fs::read_dir(path).map_err(|e| classify_io(path, e))?;
    let mut out = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| classify_io(path, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let metadata = entry.metadata().map_err(|e| classify_io(&entry.path(), e))?;
        out.push(DirEntryInfo {
            is_hidden: name.starts_with('.'),
            is_dir: metadata.is_dir(),
            size: metadata.len(),
            mtime: metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now()),
            mode: file_mode(&metadata),
            name,
        });
    }
    Ok(out)
}

/// Fully resolve all symlink components of `path`.
pub fn eval_symlinks(path: &Path) -> Result<PathBuf> {
    dunce::canonicalize(path).map_err(|e| classify_io(path, e))
}

pub fn valid_utf8(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok()
}

/// Fold `\r\n` and lone `\r` to `\n`.
pub fn normalize_newlines(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                out.push(b'\n');
                if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                    i += 1;
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    out
}

/// Split normalized, UTF-8-validated bytes into lines, per the data model:
/// split on `\n`, drop the single trailing empty element iff the raw bytes
/// ended with a newline.
pub fn split_lines(path: &Path, bytes: &[u8]) -> Result<Vec<String>> {
    if !valid_utf8(bytes) {
        return Err(Error::InvalidEncoding {
            path: path.to_path_buf(),
        });
    }
    let normalized = normalize_newlines(bytes);
    let text = String::from_utf8(normalized).expect("already validated as UTF-8");

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let ended_with_newline = text.ends_with('\n');
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    if ended_with_newline {
        lines.pop();
    }
    Ok(lines)
}

pub fn join_with_lf(lines: &[String]) -> Vec<u8> {
    lines.join("\n").into_bytes()
}

/// Detect the terminator from the first one seen in `bytes`.
pub fn detect_line_ending(bytes: &[u8]) -> NewlineStyle {
    for i in 0..bytes.len() {
        match bytes[i] {
            b'\r' => {
                return if bytes.get(i + 1) == Some(&b'\n') {
                    NewlineStyle::CrLf
                } else {
                    NewlineStyle::Cr
                };
            }
            b'\n' => return NewlineStyle::Lf,
            _ => {}
        }
    }
    NewlineStyle::Lf
}

/// Write `content` atomically: write to a sibling temp file with mode
/// `0600`, fsync, rename over `path`, then set the final mode. The temp
/// file is removed on every failure path. Does not itself take any lock —
/// callers editing an existing file serialize through the lock manager
/// first; this is the pure commit step.
pub fn write_atomic(path: &Path, content: &[u8], mode: u32, config: RobustnessConfig) -> Result<()> {
    tracing::debug!(path = %path.display(), len = content.len(), "writing file atomically");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = sibling_temp_path(path);

    let op = || -> std::result::Result<(), backoff::Error<Error>> {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode_0600()
            .open(&temp_path)
            .map_err(|e| backoff::Error::transient(Error::io(&temp_path, e)))?;

        temp_file
            .write_all(content)
            .map_err(|e| backoff::Error::transient(Error::io(&temp_path, e)))?;

        if config.enable_fsync {
            temp_file
                .sync_all()
                .map_err(|e| backoff::Error::transient(Error::io(&temp_path, e)))?;
        }
        drop(temp_file);

        fs::rename(&temp_path, path).map_err(|e| backoff::Error::transient(Error::io(path, e)))?;

        set_mode(path, mode).map_err(|e| backoff::Error::transient(e))?;
        Ok(())
    };

    let policy = ExponentialBackoff {
        max_elapsed_time: Some(config.max_retry_elapsed),
        ..ExponentialBackoff::default()
    };

    let result = backoff::retry(policy, op).map_err(|e| match e {
        backoff::Error::Permanent(err) | backoff::Error::Transient { err, .. } => err,
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_name = format!(".{file_name}.{}.tmp", std::process::id());
    path.with_file_name(temp_name)
}

fn classify_io(path: &Path, e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => Error::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Error::io(path, e),
    }
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Extension so the temp-file `OpenOptions` call reads as one chain; on
/// unix it sets the `0600` creation mode, on other platforms it's a no-op
/// since those platforms don't have the concept of a creation mode.
trait OpenOptionsExt0600 {
    fn mode_0600(&mut self) -> &mut Self;
}

#[cfg(unix)]
impl OpenOptionsExt0600 for OpenOptions {
    fn mode_0600(&mut self) -> &mut Self {
        use std::os::unix::fs::OpenOptionsExt;
        self.mode(0o600)
    }
}

#[cfg(not(unix))]
impl OpenOptionsExt0600 for OpenOptions {
    fn mode_0600(&mut self) -> &mut Self {
        self
    }
}
