//! End-to-end scenarios exercised through the JSON-RPC dispatcher, the
//! same entry point both transports call into. Each test corresponds to
//! one named scenario from the engine's test plan.

use std::sync::Arc;
use std::time::Duration;

use edit_core::{FileService, ServiceConfig};
use edit_fs::WorkingRoot;
use edit_transport::dispatch::dispatch;
use serde_json::{json, Value};
use tempfile::tempdir;

fn service_with(dir: &std::path::Path, timeout: Duration) -> FileService {
    FileService::new(Arc::new(ServiceConfig {
        working_root: WorkingRoot::new(dir).unwrap(),
        max_file_size_bytes: 10 * 1024 * 1024,
        max_line_count: 100_000,
        operation_timeout: timeout,
        max_concurrent: None,
    }))
}

fn service(dir: &std::path::Path) -> FileService {
    service_with(dir, Duration::from_secs(5))
}

/// S1: full read of a file with no range request.
#[test]
fn s1_full_read() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"line1\nline2\nline3").unwrap();
    let svc = service(dir.path());

    let result = dispatch(&svc, "read_file", json!({"name": "a.txt"})).unwrap();
    assert_eq!(result["content"], "line1\nline2\nline3");
    assert_eq!(result["total_lines"], 3);
    assert!(result.get("range_requested").is_none());
}

/// S2: range request clamped to the file's actual bounds, total_lines
/// still reports the full file.
#[test]
fn s2_range_clamp() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("c.txt"), b"l1\nl2\nl3\nl4").unwrap();
    let svc = service(dir.path());

    let result = dispatch(
        &svc,
        "read_file",
        json!({"name": "c.txt", "start_line": 2, "end_line": 3}),
    )
    .unwrap();
    assert_eq!(result["content"], "l2\nl3");
    assert_eq!(result["total_lines"], 4);
    assert_eq!(result["range_requested"]["start_line"], 2);
    assert_eq!(result["range_requested"]["end_line"], 3);
}

/// S3: a batch with a replace and an insert addressed against the
/// original (pre-edit) numbering stays stable across application order.
#[test]
fn s3_multi_edit_stability() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("b.txt"), b"l1\nl2\nl3").unwrap();
    let svc = service(dir.path());

    let result = dispatch(
        &svc,
        "edit_file",
        json!({
            "name": "b.txt",
            "edits": [
                {"line": 2, "operation": "replace", "content": "new2"},
                {"line": 3, "operation": "insert", "content": "x"}
            ]
        }),
    )
    .unwrap();
    assert_eq!(result["new_total_lines"], 4);
    assert_eq!(result["file_created"], false);

    let content = std::fs::read_to_string(dir.path().join("b.txt")).unwrap();
    assert_eq!(content, "l1\nnew2\nx\nl3");
}

/// S4: appending to a name that doesn't exist yet, with create_if_missing,
/// creates the file.
#[test]
fn s4_create_on_append() {
    let dir = tempdir().unwrap();
    let svc = service(dir.path());

    let result = dispatch(
        &svc,
        "edit_file",
        json!({"name": "new.txt", "append": "a", "create_if_missing": true}),
    )
    .unwrap();
    assert_eq!(result["file_created"], true);
    assert_eq!(result["new_total_lines"], 1);

    let bytes = std::fs::read(dir.path().join("new.txt")).unwrap();
    assert_eq!(bytes, b"a");
}

/// S5: a traversal-shaped filename is rejected as InvalidParams, not a
/// filesystem error.
#[test]
fn s5_traversal_denied() {
    let dir = tempdir().unwrap();
    let svc = service(dir.path());

    let err = dispatch(&svc, "read_file", json!({"name": "../bad"})).unwrap_err();
    assert_eq!(err.rpc_code(), edit_transport::protocol::CODE_INVALID_PARAMS);
}

/// S6: a lock held out-of-band makes a concurrent edit within the
/// operation timeout fail as LockFailed.
#[test]
fn s6_lock_conflict() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("conflict.txt"), b"x").unwrap();

    let manager = edit_fs::lock::LockManager::new();
    let _held = manager
        .acquire(&dir.path().join("conflict.txt"), Duration::from_secs(5))
        .unwrap();

    let svc = service_with(dir.path(), Duration::from_millis(100));
    let err = dispatch(
        &svc,
        "edit_file",
        json!({"name": "conflict.txt", "append": "b"}),
    )
    .unwrap_err();
    assert_eq!(err.rpc_code(), edit_transport::protocol::CODE_LOCK_FAILED);
}

/// S7: a file over the configured line cap is refused on read, citing the
/// cap in the error.
#[test]
fn s7_line_cap_refusal() {
    let dir = tempdir().unwrap();
    let contents = "x\n".repeat(10);
    std::fs::write(dir.path().join("huge.txt"), contents).unwrap();

    let svc = FileService::new(Arc::new(ServiceConfig {
        working_root: WorkingRoot::new(dir.path()).unwrap(),
        max_file_size_bytes: 10 * 1024 * 1024,
        max_line_count: 5,
        operation_timeout: Duration::from_secs(5),
        max_concurrent: None,
    }));

    let err = dispatch(&svc, "read_file", json!({"name": "huge.txt"})).unwrap_err();
    assert_eq!(err.rpc_code(), edit_transport::protocol::CODE_INVALID_PARAMS);
}

/// Confinement invariant: any name passing the character filter either
/// resolves under the working root or fails; a dangling symlink pointing
/// outside the root is rejected even though its target doesn't exist.
#[cfg(unix)]
#[test]
fn confinement_holds_for_dangling_symlink_outside_root() {
    let dir = tempdir().unwrap();
    std::os::unix::fs::symlink("/nonexistent/elsewhere", dir.path().join("dangling.txt"))
        .unwrap();
    let svc = service(dir.path());

    let err = dispatch(&svc, "read_file", json!({"name": "dangling.txt"})).unwrap_err();
    assert_eq!(err.rpc_code(), edit_transport::protocol::CODE_INVALID_PARAMS);
}

/// Round-trip: reading a file then replacing every line with its own
/// original content is a byte-for-byte no-op.
#[test]
fn round_trip_replace_with_original_is_a_no_op() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("r.txt"), b"a\nb\nc").unwrap();
    let svc = service(dir.path());

    let read = dispatch(&svc, "read_file", json!({"name": "r.txt"})).unwrap();
    let content = read["content"].as_str().unwrap();
    let lines: Vec<&str> = content.split('\n').collect();

    let edits: Vec<Value> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| json!({"line": i + 1, "operation": "replace", "content": l}))
        .collect();

    dispatch(&svc, "edit_file", json!({"name": "r.txt", "edits": edits})).unwrap();

    let after = std::fs::read(dir.path().join("r.txt")).unwrap();
    assert_eq!(after, b"a\nb\nc");
}
