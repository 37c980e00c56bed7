use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use docsort_api::{build_app, AppState};
use docsort_extract::Extractor;
use docsort_metrics::MetricsService;
use docsort_models::Config;
use docsort_store::UploadDir;
use docsort_testsupport::{memory_store, multipart_body, ScriptedTools};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    pub app: Router,
    // Keeps the upload directory alive for the test's duration.
    pub _dir: TempDir,
}

#[allow(dead_code)]
pub async fn test_app(tools: ScriptedTools) -> TestApp {
    test_app_with(tools, |_| {}).await
}

/// Like `test_app`, with a chance to adjust the config first.
#[allow(dead_code)]
pub async fn test_app_with(tools: ScriptedTools, configure: impl FnOnce(&mut Config)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    configure(&mut config);
    config.data.upload_dir = dir.path().join("uploads").display().to_string();

    let uploads = Arc::new(UploadDir::new(&config.data.upload_dir).await.unwrap());
    let state = AppState::new(
        config,
        Arc::new(memory_store().await),
        Arc::new(Extractor::new(Arc::new(tools), 2)),
        uploads,
        Arc::new(MetricsService::new().unwrap()),
    );
    let app = build_app(state.clone());
    TestApp {
        state,
        app,
        _dir: dir,
    }
}

#[allow(dead_code)]
pub fn upload_request(uri: &str, filename: &str, contents: &[u8]) -> Request<Body> {
    let (content_type, body) = multipart_body("file", filename, contents);
    Request::post(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

/// Send one request and return the status, content type and body text.
#[allow(dead_code)]
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String, String) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let content_type = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}
