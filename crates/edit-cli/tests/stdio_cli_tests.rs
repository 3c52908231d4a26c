//! End-to-end test of the stdio transport: spawn the binary, feed it
//! line-delimited JSON-RPC on stdin, assert on stdout.

use std::io::Write;
use std::process::{Command, Stdio};

use assert_fs::prelude::*;
use predicates::prelude::*;

#[test]
fn stdio_list_files_round_trip() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("a.txt").write_str("hi").unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_textedit-service"))
        .arg("--dir")
        .arg(dir.path())
        .arg("--transport")
        .arg("stdio")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn textedit-service");

    {
        let stdin = child.stdin.as_mut().unwrap();
        writeln!(
            stdin,
            r#"{{"jsonrpc":"2.0","id":1,"method":"list_files","params":{{}}}}"#
        )
        .unwrap();
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(predicate::str::contains("\"total_count\":1").eval(&stdout));
    assert!(predicate::str::contains("a.txt").eval(&stdout));
}

#[test]
fn stdio_rejects_invalid_working_directory() {
    let output = Command::new(env!("CARGO_BIN_EXE_textedit-service"))
        .arg("--dir")
        .arg("/definitely/does/not/exist")
        .arg("--transport")
        .arg("stdio")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}
