//! Decodes a method name + JSON params into a File Service call and
//! encodes the outcome back to JSON. Shared by both transports so neither
//! re-implements validation the service already performs.

use edit_core::{EditOp, FileService, Operation};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::protocol::{
    EditFileParams, EditFileResult, FileEntryWire, ListFilesParams, ListFilesResult,
    RangeRequestedWire, ReadFileParams, ReadFileResult,
};

pub fn dispatch(service: &FileService, method: &str, params: Value) -> Result<Value> {
    match method {
        "list_files" => list_files(service, params),
        "read_file" => read_file(service, params),
        "edit_file" => edit_file(service, params),
        other => Err(Error::MethodNotFound(other.to_string())),
    }
}

fn list_files(service: &FileService, params: Value) -> Result<Value> {
    if !params.is_null() && !matches!(&params, Value::Object(m) if m.is_empty()) {
        let _: ListFilesParams = serde_json::from_value(params)?;
    }

    let result = service.list()?;
    let wire = ListFilesResult {
        files: result
            .files
            .into_iter()
            .map(|f| FileEntryWire {
                name: f.name,
                modified: f.modified.to_rfc3339(),
                lines: f.lines,
                size: f.size,
                readable: f.readable,
                writable: f.writable,
            })
            .collect(),
        total_count: result.total_count,
        directory: result.directory.display().to_string(),
    };
    Ok(serde_json::to_value(wire)?)
}

fn read_file(service: &FileService, params: Value) -> Result<Value> {
    let params: ReadFileParams = serde_json::from_value(params)
        .map_err(|e| Error::InvalidRequest(e.to_string()))?;

    let result = service.read(&params.name, params.start_line, params.end_line)?;
    let wire = ReadFileResult {
        content: result.content,
        total_lines: result.total_lines,
        range_requested: result.range_requested.map(|r| RangeRequestedWire {
            start_line: r.start_line,
            end_line: r.end_line,
        }),
    };
    Ok(serde_json::to_value(wire)?)
}

fn edit_file(service: &FileService, params: Value) -> Result<Value> {
    let params: EditFileParams = serde_json::from_value(params)
        .map_err(|e| Error::InvalidRequest(e.to_string()))?;

    let edits: std::result::Result<Vec<EditOp>, edit_core::Error> = params
        .edits
        .into_iter()
        .map(|wire| {
            Ok(EditOp {
                line: wire.line,
                operation: Operation::parse(&wire.operation)?,
                content: wire.content,
            })
        })
        .collect();
    let edits = edits?;

    let result = service.edit(
        &params.name,
        &edits,
        params.append.as_deref(),
        params.create_if_missing,
    )?;
    let wire = EditFileResult {
        success: result.success,
        lines_modified: result.lines_modified,
        file_created: result.file_created,
        new_total_lines: result.new_total_lines,
    };
    Ok(serde_json::to_value(wire)?)
}

/// The shape of an error response body common to both transports:
/// `{"error": {code, message, data}}`.
pub fn error_body(err: &Error) -> Value {
    let mut error = json!({
        "code": err.rpc_code(),
        "message": err.to_string(),
    });
    if let Some(data) = err.data() {
        error["data"] = data;
    }
    json!({ "error": error })
}
