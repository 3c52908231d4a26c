//! HTTP transport: three `POST` routes mapping 1:1 to the File Service's
//! entry points. Built on the same `axum`/`tower-http` stack used for the
//! JSON HTTP API this implementation draws its HTTP idiom from, since the
//! core filesystem engine it's otherwise grounded on never needed one.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::limit::RequestBodyLimitLayer;

use edit_core::FileService;

use crate::dispatch::{dispatch, error_body};
use crate::error::Error;

const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    service: Arc<FileService>,
}

pub fn router(service: Arc<FileService>) -> Router {
    Router::new()
        .route("/list_files", post(list_files))
        .route("/read_file", post(read_file))
        .route("/edit_file", post(edit_file))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(AppState { service })
}

async fn list_files(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    handle(&state, &headers, &body, "list_files")
}

async fn read_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    handle(&state, &headers, &body, "read_file")
}

async fn edit_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    handle(&state, &headers, &body, "edit_file")
}

/// Runs the size/content-type checks ahead of JSON decoding so a
/// malformed request maps to the right error kind instead of a generic
/// Axum rejection, then calls through to the shared dispatcher.
fn handle(state: &AppState, headers: &HeaderMap, body: &[u8], method: &str) -> Response {
    if let Some(content_type) = headers.get(axum::http::header::CONTENT_TYPE) {
        let content_type = content_type.to_str().unwrap_or_default();
        if !content_type.starts_with("application/json") {
            return error_response(&Error::InvalidRequest(
                "Content-Type must be application/json".to_string(),
            ));
        }
    } else {
        return error_response(&Error::InvalidRequest(
            "Content-Type header is required".to_string(),
        ));
    }

    let params: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => return error_response(&Error::Parse(e)),
    };

    match dispatch(&state.service, method, params) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &Error) -> Response {
    err.log();
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(error_body(err))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use edit_core::ServiceConfig;
    use edit_fs::WorkingRoot;
    use std::time::Duration;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn app(dir: &std::path::Path) -> Router {
        router(Arc::new(FileService::new(Arc::new(ServiceConfig {
            working_root: WorkingRoot::new(dir).unwrap(),
            max_file_size_bytes: 10 * 1024 * 1024,
            max_line_count: 100_000,
            operation_timeout: Duration::from_secs(5),
            max_concurrent: None,
        }))))
    }

    #[tokio::test]
    async fn non_post_method_is_rejected_by_the_router() {
        let app = app(&tempdir().unwrap().path().to_path_buf());
        let request = Request::builder()
            .method("GET")
            .uri("/list_files")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn missing_content_type_is_rejected() {
        let dir = tempdir().unwrap();
        let app = app(dir.path());
        let request = Request::builder()
            .method("POST")
            .uri("/list_files")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_files_returns_200_with_json_body() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"hi").unwrap();
        let app = app(dir.path());

        let request = Request::builder()
            .method("POST")
            .uri("/list_files")
            .header("content-type", "application/json; charset=utf-8")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn read_file_not_found_returns_404() {
        let dir = tempdir().unwrap();
        let app = app(dir.path());

        let request = Request::builder()
            .method("POST")
            .uri("/read_file")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"missing.txt"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn traversal_attempt_returns_400() {
        let dir = tempdir().unwrap();
        let app = app(dir.path());

        let request = Request::builder()
            .method("POST")
            .uri("/read_file")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"../bad"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
