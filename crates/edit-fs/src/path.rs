//! Confinement: turning a caller-supplied filename into a path proven to sit
//! inside the working root, before and after symlink resolution.

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::io;
use crate::{Error, Result};

const MIN_FILENAME_LEN: usize = 1;
const MAX_FILENAME_LEN: usize = 255;

fn filename_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("filename pattern is valid"))
}

/// Validate a caller-supplied filename against the character set, length and
/// `.`/`..` rules from the data model. Pure function, no filesystem access.
pub fn validate_filename(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_FILENAME_LEN {
        return Err(Error::InvalidFilename {
            name: name.to_string(),
            reason: format!("length must be {MIN_FILENAME_LEN}-{MAX_FILENAME_LEN} bytes"),
        });
    }
    if name == "." || name == ".." {
        return Err(Error::InvalidFilename {
            name: name.to_string(),
            reason: "must not be `.` or `..`".to_string(),
        });
    }
    if !filename_pattern().is_match(name) {
        return Err(Error::InvalidFilename {
            name: name.to_string(),
            reason: "must match ^[A-Za-z0-9._-]+$".to_string(),
        });
    }
    Ok(())
}

/// The directory every request is confined to. Canonicalized once at
/// startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingRoot(PathBuf);

impl WorkingRoot {
    /// Canonicalize and validate `path`: it must exist and be a directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let canonical = dunce::canonicalize(path).map_err(|e| Error::io(path, e))?;
        if !canonical.is_dir() {
            return Err(Error::NotADirectory { path: canonical });
        }
        Ok(Self(canonical))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for WorkingRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Lexically clean a path: drop `.` components and resolve `..` against
/// what has been pushed so far, without touching the filesystem.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut ret = if let Some(c @ Component::Prefix(..)) = components.peek().cloned() {
        components.next();
        PathBuf::from(c.as_os_str())
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::Prefix(..) => unreachable!(),
            Component::RootDir => ret.push(component),
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => ret.push(c),
        }
    }
    ret
}

fn is_within(root: &Path, candidate: &Path) -> bool {
    candidate.starts_with(root)
}

/// Resolve `filename` to an absolute path inside `root`, rejecting any
/// attempt — lexical or via a symlink — to escape it. Returns the
/// unresolved (pre-symlink) candidate path on success; the OS follows the
/// symlink on open, this function only validates that it is safe to do so.
pub fn resolve(root: &WorkingRoot, filename: &str) -> Result<PathBuf> {
    validate_filename(filename)?;

    let candidate = normalize_path(&root.as_path().join(filename));
    if !is_within(root.as_path(), &candidate) {
        return Err(Error::PathTraversal { path: candidate });
    }

    match io::eval_symlinks(&candidate) {
        Ok(resolved) => {
            if !is_within(root.as_path(), &resolved) {
                return Err(Error::PathTraversal { path: candidate });
            }
            Ok(candidate)
        }
        Err(Error::NotFound { .. }) => {
            reject_dangling_traversal(root.as_path(), &candidate)?;
            Err(Error::NotFound { path: candidate })
        }
        Err(e) => Err(e),
    }
}

/// A dangling symlink whose target would lie outside the root must be
/// rejected as traversal even though the target does not exist.
fn reject_dangling_traversal(root: &Path, candidate: &Path) -> Result<()> {
    let metadata = match std::fs::symlink_metadata(candidate) {
        Ok(m) => m,
        Err(_) => return Ok(()),
    };
    if !metadata.file_type().is_symlink() {
        return Ok(());
    }

    let target = std::fs::read_link(candidate).map_err(|e| Error::io(candidate, e))?;
    let absolute_target = if target.is_absolute() {
        target
    } else {
        candidate
            .parent()
            .unwrap_or(root)
            .join(&target)
    };
    let resolved_target = normalize_path(&absolute_target);

    if !is_within(root, &resolved_target) {
        return Err(Error::PathTraversal {
            path: candidate.to_path_buf(),
        });
    }
    Ok(())
}
