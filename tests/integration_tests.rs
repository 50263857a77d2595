//! Integration tests for the Docscan HTTP surface

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use docscan::{
    config::Config,
    error::{AppError, AppResult},
    models::{ErrorResponse, ExtractResponse, HealthResponse},
    handlers::create_router,
    services::{
        document::{Block, BlockKind},
        DocumentAnalyzer, FixtureAnalyzer,
    },
    state::AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "docscan-test-boundary";

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/two_page_tables.json")
}

struct FailingAnalyzer;

#[async_trait]
impl DocumentAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _content: &[u8]) -> AppResult<Vec<Block>> {
        Err(AppError::analysis("service unavailable"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn test_app(analyzer: Arc<dyn DocumentAnalyzer>) -> (Router, TempDir) {
    test_app_with_config(Config::default(), analyzer)
}

fn test_app_with_config(
    config: Config,
    analyzer: Arc<dyn DocumentAnalyzer>,
) -> (Router, TempDir) {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = Config {
        upload_dir: upload_dir.path().to_path_buf(),
        ..config
    };
    (create_router(AppState::new(config, analyzer)), upload_dir)
}

fn fixture_app() -> (Router, TempDir) {
    let analyzer = FixtureAnalyzer::from_json_file(&fixture_path()).unwrap();
    test_app(Arc::new(analyzer))
}

fn multipart_body(field_name: &str, file_name: Option<&str>, content: &[u8]) -> Vec<u8> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field_name}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field_name}\""),
    };

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    if file_name.is_some() {
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, field_name: &str, file_name: Option<&str>, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field_name, file_name, content)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn assert_dir_empty(dir: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
    assert!(leftovers.is_empty(), "upload dir not empty: {leftovers:?}");
}

#[tokio::test]
async fn test_home_renders_upload_form() {
    let (app, _dir) = fixture_app();

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("action=\"/process\""));
    assert!(body.contains("name=\"file\""));
    assert!(!body.contains("class=\"message\""));
}

#[tokio::test]
async fn test_process_without_file_field() {
    let (app, _dir) = fixture_app();

    let response = app
        .oneshot(upload_request("/process", "comment", None, b"hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("No file uploaded"));
}

#[tokio::test]
async fn test_process_without_multipart_body() {
    let (app, _dir) = fixture_app();

    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("No file uploaded"));
}

#[tokio::test]
async fn test_process_rejects_empty_file_name() {
    let (app, dir) = fixture_app();

    let response = app
        .oneshot(upload_request("/process", "file", Some(""), b"data"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Invalid file name or extension"));
    assert_dir_empty(dir.path());
}

#[tokio::test]
async fn test_process_rejects_disallowed_extension() {
    let (app, dir) = fixture_app();

    let response = app
        .oneshot(upload_request("/process", "file", Some("notes.txt"), b"plain text"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Invalid file name or extension"));
    assert_dir_empty(dir.path());
}

#[tokio::test]
async fn test_process_renders_text_and_tables() {
    let (app, dir) = fixture_app();

    let response = app
        .oneshot(upload_request("/process", "file", Some("invoice.PDF"), b"%PDF-1.7 test"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Invoice 42"));
    assert!(body.contains("Totals"));
    assert!(body.contains("<td>Apples </td>"));
    assert!(body.contains("Table 2"));
    assert!(body.contains("/download_text?text="));

    assert_dir_empty(dir.path());
}

#[tokio::test]
async fn test_process_without_tables_removes_upload() {
    let blocks = vec![
        Block::new(BlockKind::Page, "p1"),
        Block::new(BlockKind::Line, "l1").with_text("Just a receipt"),
    ];
    let (app, dir) = test_app(Arc::new(FixtureAnalyzer::new(blocks)));

    let response = app
        .oneshot(upload_request("/process", "file", Some("receipt.jpg"), b"\xff\xd8\xff"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Just a receipt"));
    assert!(body.contains("No tables found."));

    assert_dir_empty(dir.path());
}

#[tokio::test]
async fn test_process_analysis_failure_is_server_error() {
    let (app, dir) = test_app(Arc::new(FailingAnalyzer));

    let response = app
        .oneshot(upload_request("/process", "file", Some("scan.png"), b"\x89PNG"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error: ErrorResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(!error.success);
    assert_eq!(error.error.code, "ANALYSIS_ERROR");
    assert!(error.error.message.contains("service unavailable"));

    assert_dir_empty(dir.path());
}

#[tokio::test]
async fn test_download_without_text() {
    let (app, _dir) = fixture_app();

    let response = app.clone().oneshot(get("/download_text")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "Error: No extracted text available to download."
    );

    let response = app.oneshot(get("/download_text?text=")).await.unwrap();
    assert_eq!(
        body_string(response).await,
        "Error: No extracted text available to download."
    );
}

#[tokio::test]
async fn test_download_returns_attachment() {
    let (app, _dir) = fixture_app();

    let response = app.oneshot(get("/download_text?text=hello")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("extracted_text.txt"));

    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));

    assert_eq!(body_string(response).await, "hello");
}

#[tokio::test]
async fn test_download_decodes_query_text() {
    let (app, _dir) = fixture_app();

    let response = app
        .oneshot(get("/download_text?text=line%20one%0Aline%20two%20%26%20more"))
        .await
        .unwrap();
    assert_eq!(body_string(response).await, "line one\nline two & more");
}

#[tokio::test]
async fn test_api_extract_returns_json() {
    let (app, dir) = fixture_app();

    let response = app
        .oneshot(upload_request("/api/v1/extract", "file", Some("invoice.pdf"), b"%PDF-1.7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ExtractResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body.success);
    assert_eq!(body.data.pages, 2);
    assert_eq!(body.data.text, "Invoice 42\n\nTotals\n\n");
    assert_eq!(body.data.tables.len(), 2);
    assert_eq!(body.data.tables[0][0], vec!["Item ".to_string(), "Qty ".to_string()]);

    assert_dir_empty(dir.path());
}

#[tokio::test]
async fn test_api_extract_missing_file() {
    let (app, _dir) = fixture_app();

    let response = app
        .oneshot(upload_request("/api/v1/extract", "comment", None, b"nothing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(error.error.code, "MISSING_FILE");
}

#[tokio::test]
async fn test_api_extract_invalid_extension() {
    let (app, _dir) = fixture_app();

    let response = app
        .oneshot(upload_request("/api/v1/extract", "file", Some("scan.docx"), b"PK"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(error.error.code, "INVALID_FILE");
}

#[tokio::test]
async fn test_api_extract_oversized_upload() {
    let analyzer = FixtureAnalyzer::from_json_file(&fixture_path()).unwrap();
    let config = Config {
        max_file_size_mb: 1,
        ..Config::default()
    };
    let (app, dir) = test_app_with_config(config, Arc::new(analyzer));

    let content = vec![b'A'; 2 * 1024 * 1024];
    let response = app
        .oneshot(upload_request("/api/v1/extract", "file", Some("big.pdf"), &content))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let error: ErrorResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(error.error.code, "FILE_TOO_LARGE");
    assert!(error.error.message.contains("1MB"));

    assert_dir_empty(dir.path());
}

#[tokio::test]
async fn test_process_oversized_upload() {
    let config = Config {
        max_file_size_mb: 1,
        ..Config::default()
    };
    let (app, dir) = test_app_with_config(config, Arc::new(FailingAnalyzer));

    let content = vec![b'A'; 2 * 1024 * 1024];
    let response = app
        .oneshot(upload_request("/process", "file", Some("big.png"), &content))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let error: ErrorResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(error.error.code, "FILE_TOO_LARGE");

    assert_dir_empty(dir.path());
}

fn response_request_id(response: &Response) -> String {
    response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_error_envelope_reuses_client_request_id() {
    let (app, _dir) = test_app(Arc::new(FailingAnalyzer));

    let mut request = upload_request("/api/v1/extract", "file", Some("scan.pdf"), b"%PDF");
    request
        .headers_mut()
        .insert("x-request-id", "test-request-42".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response_request_id(&response), "test-request-42");

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"]["request_id"], "test-request-42");
}

#[tokio::test]
async fn test_error_envelope_matches_generated_request_id() {
    let (app, _dir) = fixture_app();

    let response = app
        .oneshot(upload_request("/api/v1/extract", "comment", None, b"nothing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let header_id = response_request_id(&response);
    assert!(!header_id.is_empty());

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"]["request_id"], header_id.as_str());
}

#[tokio::test]
async fn test_health_and_request_id() {
    let (app, _dir) = fixture_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());

    let health: HealthResponse = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "docscan");
    assert!(health.uptime_seconds.is_some());
}

#[tokio::test]
async fn test_config_loading() {
    env::remove_var("SERVER_HOST");
    env::remove_var("SERVER_PORT");
    env::remove_var("MAX_FILE_SIZE_MB");
    env::remove_var("ALLOWED_EXTENSIONS");
    env::remove_var("AWS_REGION");
    env::remove_var("TEXTRACT_ENDPOINT");

    env::set_var("SERVER_HOST", "127.0.0.1");
    env::set_var("SERVER_PORT", "9090");
    env::set_var("MAX_FILE_SIZE_MB", "not-a-number");
    env::set_var("ALLOWED_EXTENSIONS", "PDF,tiff");
    env::set_var("AWS_REGION", "eu-west-1");
    env::set_var("TEXTRACT_ENDPOINT", "  ");

    let config = Config::from_env().unwrap();
    assert_eq!(config.server_host, "127.0.0.1");
    assert_eq!(config.server_port, 9090);
    assert_eq!(config.max_file_size_mb, 10);
    assert!(config.allowed_extensions.contains("pdf"));
    assert!(config.allowed_extensions.contains("tiff"));
    assert!(!config.allowed_extensions.contains("png"));
    assert_eq!(config.aws_region, "eu-west-1");
    assert_eq!(config.textract_endpoint, None);

    env::remove_var("SERVER_HOST");
    env::remove_var("SERVER_PORT");
    env::remove_var("MAX_FILE_SIZE_MB");
    env::remove_var("ALLOWED_EXTENSIONS");
    env::remove_var("AWS_REGION");
    env::remove_var("TEXTRACT_ENDPOINT");
}
