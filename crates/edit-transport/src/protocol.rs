//! Wire types for both transports. JSON-RPC envelopes are shared with the
//! stdio transport; the request/response payload structs are shared with
//! both, since the HTTP body is simply the JSON-RPC `params`/`result`
//! shape flattened to the top level.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC reserved codes plus this service's two custom classes.
pub const CODE_PARSE_ERROR: i32 = -32700;
pub const CODE_INVALID_REQUEST: i32 = -32600;
pub const CODE_METHOD_NOT_FOUND: i32 = -32601;
pub const CODE_INVALID_PARAMS: i32 = -32602;
pub const CODE_INTERNAL_ERROR: i32 = -32603;
pub const CODE_FILESYSTEM: i32 = -32001;
pub const CODE_LOCK_FAILED: i32 = -32002;

#[derive(Debug, Deserialize)]
pub struct ListFilesParams {}

#[derive(Debug, Deserialize, Default)]
pub struct ReadFileParams {
    pub name: String,
    pub start_line: Option<usize>,
    pub end_line: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct EditOpWire {
    pub line: usize,
    pub operation: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct EditFileParams {
    pub name: String,
    #[serde(default)]
    pub edits: Vec<EditOpWire>,
    pub append: Option<String>,
    #[serde(default)]
    pub create_if_missing: bool,
}

#[derive(Debug, Serialize)]
pub struct FileEntryWire {
    pub name: String,
    pub modified: String,
    pub lines: i64,
    pub size: u64,
    pub readable: bool,
    pub writable: bool,
}

#[derive(Debug, Serialize)]
pub struct ListFilesResult {
    pub files: Vec<FileEntryWire>,
    pub total_count: usize,
    pub directory: String,
}

#[derive(Debug, Serialize)]
pub struct RangeRequestedWire {
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Serialize)]
pub struct ReadFileResult {
    pub content: String,
    pub total_lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_requested: Option<RangeRequestedWire>,
}

#[derive(Debug, Serialize)]
pub struct EditFileResult {
    pub success: bool,
    pub lines_modified: usize,
    pub file_created: bool,
    pub new_total_lines: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_id_is_a_notification() {
        let json = r#"{"jsonrpc":"2.0","method":"list_files","params":{}}"#;
        let request: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert!(request.id.is_none());
        assert_eq!(request.method, "list_files");
    }

    #[test]
    fn request_without_params_defaults_to_null() {
        let json = r#"{"jsonrpc":"2.0","id":1,"method":"list_files"}"#;
        let request: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.params, Value::Null);
    }

    #[test]
    fn success_response_omits_error_field() {
        let response =
            JsonRpcResponse::success(Some(Value::Number(1.into())), serde_json::json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("result"));
        assert!(!json.contains("error"));
    }

    #[test]
    fn error_response_omits_result_field() {
        let response = JsonRpcResponse::error(
            Some(Value::Number(1.into())),
            CODE_INVALID_REQUEST,
            "bad request".to_string(),
            None,
        );
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("error"));
        assert!(!json.contains("result"));
        assert!(json.contains("-32600"));
    }

    #[test]
    fn edit_file_params_default_edits_to_empty_vec() {
        let json = r#"{"name":"a.txt","append":"x"}"#;
        let params: EditFileParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.name, "a.txt");
        assert!(params.edits.is_empty());
        assert_eq!(params.append.as_deref(), Some("x"));
        assert!(!params.create_if_missing);
    }
}
