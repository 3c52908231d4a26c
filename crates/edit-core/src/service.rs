//! Orchestrates `list` / `read` / `edit`: validates input, resolves paths
//! via `edit_fs::path`, enforces size/line caps, drives the edit engine,
//! and commits via atomic write. The only component transports call into.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use edit_fs::{io as fsio, lock::LockManager, path as fspath, WorkingRoot};

use crate::engine::{self, EditOp};
use crate::error::{Error, Result};

/// Default and bound constants from the data model.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_LINE_COUNT: usize = 100_000;
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable, validated record assembled once at process start. Threaded
/// through the File Service by value/`Arc`; never a global.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub working_root: WorkingRoot,
    pub max_file_size_bytes: u64,
    pub max_line_count: usize,
    pub operation_timeout: Duration,
    pub max_concurrent: Option<usize>,
}

impl ServiceConfig {
    pub fn max_size_mb(&self) -> u64 {
        self.max_file_size_bytes / (1024 * 1024)
    }
}

/// One entry in a `list` response.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub modified: DateTime<Utc>,
    pub lines: i64,
    pub size: u64,
    pub readable: bool,
    pub writable: bool,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub files: Vec<FileEntry>,
    pub total_count: usize,
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RangeRequested {
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone)]
pub struct ReadResult {
    pub content: String,
    pub total_lines: usize,
    pub range_requested: Option<RangeRequested>,
}

#[derive(Debug, Clone)]
pub struct EditResult {
    pub success: bool,
    pub lines_modified: usize,
    pub file_created: bool,
    pub new_total_lines: usize,
}

pub struct FileService {
    config: Arc<ServiceConfig>,
    locks: LockManager,
}

impl FileService {
    pub fn new(config: Arc<ServiceConfig>) -> Self {
        Self {
            config,
            locks: LockManager::new(),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// `list`: enumerate non-hidden, non-directory entries of the working
    /// root, sorted by name. A per-entry read/stat failure degrades that
    /// entry's `lines` to `-1`; it never fails the whole listing.
    pub fn list(&self) -> Result<ListResult> {
        let root = self.config.working_root.as_path();
        let entries = fsio::list_dir(root).map_err(|e| Error::from_fs(e, ""))?;

        let mut files: Vec<FileEntry> = entries
            .into_iter()
            .filter(|e| !e.is_dir && !e.is_hidden)
            .map(|e| {
                let lines = self.count_lines_for_listing(&root.join(&e.name), e.size);
                FileEntry {
                    name: e.name,
                    modified: e.mtime,
                    lines,
                    size: e.size,
                    readable: e.mode & 0o444 != 0,
                    writable: e.mode & 0o222 != 0,
                }
            })
            .collect();

        files.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        let total_count = files.len();

        Ok(ListResult {
            files,
            total_count,
            directory: root.to_path_buf(),
        })
    }

    fn count_lines_for_listing(&self, path: &std::path::Path, size: u64) -> i64 {
        if size == 0 {
            return 0;
        }
        if size > self.config.max_file_size_bytes {
            return -1;
        }
        let bytes = match fsio::read_bytes(path) {
            Ok(b) => b,
            Err(_) => return -1,
        };
        if !fsio::valid_utf8(&bytes) {
            return -1;
        }
        match fsio::split_lines(path, &bytes) {
            Ok(lines) if lines.len() <= self.config.max_line_count => lines.len() as i64,
            _ => -1,
        }
    }

    /// `read(name, start?, end?)`.
    pub fn read(
        &self,
        name: &str,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Result<ReadResult> {
        if let Some(s) = start {
            if s < 1 {
                return Err(Error::invalid_params("start_line must be >= 1").with_filename(name));
            }
        }
        if let Some(e) = end {
            if e < 1 {
                return Err(Error::invalid_params("end_line must be >= 1").with_filename(name));
            }
        }
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(
                    Error::invalid_params("start_line must be <= end_line").with_filename(name)
                );
            }
        }

        let path = self.resolve(name)?;
        let stat = fsio::stat(&path).map_err(|e| Error::from_fs(e, name))?;
        if stat.is_dir {
            return Err(Error::invalid_params("target is a directory").with_filename(name));
        }
        if stat.size > self.config.max_file_size_bytes {
            return Err(Error::FileTooLarge {
                filename: name.to_string(),
                max_size_mb: self.config.max_size_mb(),
            });
        }

        let bytes = fsio::read_bytes(&path).map_err(|e| Error::from_fs(e, name))?;
        if !fsio::valid_utf8(&bytes) {
            return Err(Error::InvalidEncoding {
                filename: name.to_string(),
            });
        }
        let lines = fsio::split_lines(&path, &bytes).map_err(|e| Error::from_fs(e, name))?;
        if lines.len() > self.config.max_line_count {
            return Err(Error::invalid_params(format!(
                "file exceeds max line count of {}",
                self.config.max_line_count
            ))
            .with_filename(name));
        }

        let total_lines = lines.len();
        let range_requested = match (start, end) {
            (None, None) => None,
            (s, e) => Some(RangeRequested {
                start_line: s.unwrap_or(1),
                end_line: e.unwrap_or(total_lines),
            }),
        };

        let (window_start, window_end) = match &range_requested {
            None => (1, total_lines),
            Some(r) => (r.start_line, r.end_line),
        };

        if total_lines == 0 {
            if range_requested.is_some() {
                return Err(Error::invalid_params("file is empty").with_filename(name));
            }
            return Ok(ReadResult {
                content: String::new(),
                total_lines: 0,
                range_requested,
            });
        }

        if window_start > total_lines {
            return Err(Error::InvalidParams {
                message: format!("start_line {window_start} exceeds {total_lines} line(s)"),
                filename: Some(name.to_string()),
                operation: None,
                line: Some(window_start),
                total_lines: Some(total_lines),
            });
        }
        let window_end = window_end.min(total_lines);

        let content = lines[window_start - 1..window_end].join("\n");

        Ok(ReadResult {
            content,
            total_lines,
            range_requested,
        })
    }

    /// `edit(name, edits, append, create_if_missing)`.
    pub fn edit(
        &self,
        name: &str,
        edits: &[EditOp],
        append: Option<&str>,
        create_if_missing: bool,
    ) -> Result<EditResult> {
        if edits.len() > 1000 {
            return Err(Error::invalid_params("batch exceeds 1000 edits").with_filename(name));
        }

        let path = self.resolve_for_edit(name, create_if_missing)?;

        let _guard = self
            .locks
            .acquire(&path, self.config.operation_timeout)
            .map_err(|e| Error::from_fs(e, name))?;

        let existing = fsio::exists(&path).map_err(|e| Error::from_fs(e, name))?;

        let (lines, newline_style, created) = if existing {
            let stat = fsio::stat(&path).map_err(|e| Error::from_fs(e, name))?;
            if stat.is_dir {
                return Err(Error::invalid_params("target is a directory").with_filename(name));
            }
            if stat.size > self.config.max_file_size_bytes {
                return Err(Error::FileTooLarge {
                    filename: name.to_string(),
                    max_size_mb: self.config.max_size_mb(),
                });
            }
            let bytes = fsio::read_bytes(&path).map_err(|e| Error::from_fs(e, name))?;
            if !fsio::valid_utf8(&bytes) {
                return Err(Error::InvalidEncoding {
                    filename: name.to_string(),
                });
            }
            let style = fsio::detect_line_ending(&bytes);
            let lines = fsio::split_lines(&path, &bytes).map_err(|e| Error::from_fs(e, name))?;
            if lines.len() > self.config.max_line_count {
                return Err(Error::invalid_params(format!(
                    "file exceeds max line count of {}",
                    self.config.max_line_count
                ))
                .with_filename(name));
            }
            (lines, style, false)
        } else if create_if_missing {
            (Vec::new(), fsio::NewlineStyle::Lf, true)
        } else {
            return Err(Error::NotFound {
                filename: name.to_string(),
            });
        };

        let outcome = engine::apply(lines, edits, append, name)?;

        if outcome.lines.len() > self.config.max_line_count {
            return Err(Error::invalid_params(format!(
                "edit would exceed max line count of {}",
                self.config.max_line_count
            ))
            .with_filename(name));
        }

        let mut bytes = fsio::join_with_lf(&outcome.lines);
        if newline_style != fsio::NewlineStyle::Lf && !bytes.is_empty() {
            bytes = rewrite_terminators(&bytes, newline_style);
        }

        if bytes.len() as u64 > self.config.max_file_size_bytes {
            return Err(Error::FileTooLarge {
                filename: name.to_string(),
                max_size_mb: self.config.max_size_mb(),
            });
        }

        fsio::write_atomic(&path, &bytes, 0o644, fsio::RobustnessConfig::default())
            .map_err(|e| Error::from_fs(e, name))?;

        tracing::info!(
            filename = name,
            lines_modified = outcome.lines_modified,
            file_created = created,
            "edit committed"
        );

        Ok(EditResult {
            success: true,
            lines_modified: outcome.lines_modified,
            file_created: created,
            new_total_lines: outcome.lines.len(),
        })
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        fspath::resolve(&self.config.working_root, name).map_err(|e| {
            tracing::warn!(filename = name, error = %e, "path resolution rejected");
            Error::from_fs(e, name)
        })
    }

    /// Same as `resolve`, except a `NotFound` is expected and benign when
    /// `create_if_missing` is set — the caller decides what to do with it.
    fn resolve_for_edit(&self, name: &str, create_if_missing: bool) -> Result<PathBuf> {
        match fspath::resolve(&self.config.working_root, name) {
            Ok(path) => Ok(path),
            Err(edit_fs::Error::NotFound { path }) if create_if_missing => Ok(path),
            Err(e) => {
                tracing::warn!(filename = name, error = %e, "path resolution rejected");
                Err(Error::from_fs(e, name))
            }
        }
    }
}

fn rewrite_terminators(lf_bytes: &[u8], style: fsio::NewlineStyle) -> Vec<u8> {
    if style == fsio::NewlineStyle::Lf {
        return lf_bytes.to_vec();
    }
    let terminator = style.as_str().as_bytes();
    let mut out = Vec::with_capacity(lf_bytes.len());
    for &b in lf_bytes {
        if b == b'\n' {
            out.extend_from_slice(terminator);
        } else {
            out.push(b);
        }
    }
    out
}
