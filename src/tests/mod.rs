//! Integration and unit tests for the records application.
//!
//! ## Test Modules
//!
//! - **api_tests**: form, CSV and gallery round trips through the full router
//! - **policy_tests**: delete policies and dangling references
//! - **db_tests**: schema and store operations against a temporary database
//! - **config_tests**: configuration loading and validation
//! - **error_tests**: error mapping to HTTP responses
//!
//! Every test gets its own SQLite file and uploads directory inside a `TempDir`.

pub mod api_tests;
pub mod error_tests;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::{AppConfig, DeletePolicy};
use crate::state::AppState;

pub const BOUNDARY: &str = "XUNIVERSITYBOUNDARY";

/// A router over a throwaway database; the directory lives as long as this value.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub dir: TempDir,
}

pub async fn test_pool(dir: &TempDir) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("university.db"))
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await.unwrap();
    crate::db::init_db(&pool).await.unwrap();
    pool
}

pub async fn setup_app(policy: DeletePolicy) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let pool = test_pool(&dir).await;

    let mut config = AppConfig::default();
    config.database.url = format!("sqlite://{}", dir.path().join("university.db").display());
    config.uploads.root = dir.path().join("uploads").display().to_string();
    config.records.delete_policy = policy;

    let state = AppState::new(pool, config).unwrap();
    let app = crate::build_router(state.clone());
    TestApp { app, state, dir }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    /// Posts a urlencoded form; `fields` values must already be urlencoded.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>().join("&");
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// Posts a multipart body with a single `file` field.
    pub async fn post_file(&self, uri: &str, file_name: &str, content: &[u8]) -> Response<Body> {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(multipart_body("file", file_name, content)))
            .unwrap();
        self.send(req).await
    }
}

pub fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n", field, file_name).as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn body_bytes(res: Response<Body>) -> Vec<u8> {
    res.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_text(res: Response<Body>) -> String {
    String::from_utf8(body_bytes(res).await).unwrap()
}

pub fn assert_redirect(res: &Response<Body>, location: &str) {
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), location);
}
