//! JSON-RPC 2.0 over stdin/stdout: one object per line. Logging is the
//! caller's responsibility to route to stderr (see `edit-cli`), since
//! stdout here carries the protocol and must never be touched by
//! anything else.

use std::io::{BufRead, Write};
use std::sync::Arc;

use serde_json::Value;

use edit_core::FileService;

use crate::dispatch::{dispatch, error_body};
use crate::error::Error;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

pub struct StdioServer {
    service: Arc<FileService>,
}

impl StdioServer {
    pub fn new(service: Arc<FileService>) -> Self {
        Self { service }
    }

    /// Blocking read loop: one request per line on stdin, one response per
    /// line on stdout. Returns once stdin is closed.
    pub fn run(&self) -> std::io::Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        tracing::info!("stdio transport ready");

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "received message");

            let response = self.handle_message(&line);
            if !response.is_empty() {
                writeln!(stdout, "{response}")?;
                stdout.flush()?;
            }
        }

        Ok(())
    }

    /// Parse and dispatch one request, returning the serialized response
    /// (empty string for a notification — unused by this protocol, which
    /// has no notification methods, but the shape is preserved so the
    /// dispatch path matches the one the ambient stack's logging expects).
    pub fn handle_message(&self, message: &str) -> String {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(r) => r,
            Err(e) => {
                let err = Error::Parse(e);
                err.log();
                let response =
                    JsonRpcResponse::error(None, err.rpc_code(), err.to_string(), err.data());
                return serde_json::to_string(&response).unwrap_or_default();
            }
        };

        let id = request.id.clone();
        match dispatch(&self.service, &request.method, request.params) {
            Ok(result) => {
                let response = JsonRpcResponse::success(id, result);
                serde_json::to_string(&response).unwrap_or_default()
            }
            Err(err) => {
                err.log();
                let response =
                    JsonRpcResponse::error(id, err.rpc_code(), err.to_string(), err.data());
                serde_json::to_string(&response).unwrap_or_default()
            }
        }
    }
}
