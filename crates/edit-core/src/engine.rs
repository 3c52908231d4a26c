//! The line-based edit algebra: applying an ordered batch of operations
//! against an in-memory line vector under the "line numbers refer to
//! pre-edit state" contract.

use crate::error::Error;

/// One of the three addressable operations a batch entry can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Replace,
    Insert,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Replace => "replace",
            Operation::Insert => "insert",
            Operation::Delete => "delete",
        }
    }

    pub fn parse(token: &str) -> Result<Self, Error> {
        match token {
            "replace" => Ok(Operation::Replace),
            "insert" => Ok(Operation::Insert),
            "delete" => Ok(Operation::Delete),
            other => Err(Error::invalid_params(format!(
                "unknown operation {other:?}, expected replace|insert|delete"
            ))),
        }
    }
}

/// A single edit, addressed by 1-based line number against the file state
/// before any edit in the batch was applied.
#[derive(Debug, Clone)]
pub struct EditOp {
    pub line: usize,
    pub operation: Operation,
    pub content: Option<String>,
}

impl EditOp {
    /// `content` must be absent/empty for `delete`, and valid UTF-8 (always
    /// true for a Rust `String`) for `replace`/`insert`. `line` must be
    /// ≥ 1; the upper bound is checked against the live vector during apply.
    pub fn validate(&self) -> Result<(), Error> {
        if self.line < 1 {
            return Err(Error::invalid_params("line must be >= 1"));
        }
        match self.operation {
            Operation::Delete => {
                if self.content.as_deref().is_some_and(|c| !c.is_empty()) {
                    return Err(Error::invalid_params(
                        "delete must not carry content",
                    ));
                }
            }
            Operation::Replace | Operation::Insert => {
                if self.content.is_none() {
                    return Err(Error::invalid_params(format!(
                        "{} requires content",
                        self.operation.as_str()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Outcome of applying a batch: the full resulting line vector and how many
/// lines the caller should be told changed (see the `LinesModified` rule).
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub lines: Vec<String>,
    pub lines_modified: usize,
}

/// Apply `edits` (optionally followed by `append`) to `lines`. Edits are
/// stable-sorted by `line` descending before application: processing high
/// line numbers first means earlier (lower-numbered) edits' targets are
/// never shifted by a not-yet-applied edit, honoring the pre-edit-numbering
/// contract in a single pass.
pub fn apply(
    lines: Vec<String>,
    edits: &[EditOp],
    append: Option<&str>,
    filename: &str,
) -> Result<ApplyOutcome, Error> {
    for edit in edits {
        edit.validate()
            .map_err(|e| attach_filename(e, filename))?;
    }

    let original_count = lines.len();
    let mut working = lines;

    let mut ordered: Vec<&EditOp> = edits.iter().collect();
    ordered.sort_by(|a, b| b.line.cmp(&a.line));

    for edit in ordered {
        let n = working.len();
        match edit.operation {
            Operation::Replace => {
                if edit.line < 1 || edit.line > n {
                    return Err(out_of_range(filename, edit, n));
                }
                working[edit.line - 1] = edit.content.clone().unwrap_or_default();
            }
            Operation::Insert => {
                if edit.line < 1 || edit.line > n + 1 {
                    return Err(out_of_range(filename, edit, n));
                }
                working.insert(edit.line - 1, edit.content.clone().unwrap_or_default());
            }
            Operation::Delete => {
                if edit.line < 1 || edit.line > n {
                    return Err(out_of_range(filename, edit, n));
                }
                working.remove(edit.line - 1);
            }
        }
    }

    if let Some(append_text) = append {
        if !append_text.is_empty() {
            working.extend(edit_fs::io::split_lines(
                std::path::Path::new(filename),
                append_text.as_bytes(),
            )
            .map_err(|e| Error::from_fs(e, filename))?);
        }
    }

    let lines_modified = working.len().abs_diff(original_count);

    Ok(ApplyOutcome {
        lines: working,
        lines_modified,
    })
}

fn out_of_range(filename: &str, edit: &EditOp, total_lines: usize) -> Error {
    Error::InvalidParams {
        message: format!(
            "{} at line {} out of range for {} line(s)",
            edit.operation.as_str(),
            edit.line,
            total_lines
        ),
        filename: Some(filename.to_string()),
        operation: Some(edit.operation.as_str().to_string()),
        line: Some(edit.line),
        total_lines: Some(total_lines),
    }
}

fn attach_filename(err: Error, filename: &str) -> Error {
    match err {
        Error::InvalidParams {
            message,
            operation,
            line,
            total_lines,
            ..
        } => Error::InvalidParams {
            message,
            filename: Some(filename.to_string()),
            operation,
            line,
            total_lines,
        },
        other => other,
    }
}
