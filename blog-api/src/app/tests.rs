use super::{app_router, AppState};
use crate::config::{ApiConfig, RunMode};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use blog_core::{AppCredential, UploadPolicy};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_config(dir: &TempDir) -> ApiConfig {
    ApiConfig {
        run_mode: RunMode::Release,
        data_dir: dir.path().join("data"),
        upload_save_path: dir.path().join("uploads"),
        upload_server_url: "http://127.0.0.1:8000/static".into(),
        upload_image_max_size: 1,
        jwt_secret: "test-secret".into(),
        credentials: vec![AppCredential {
            app_key: "blog".into(),
            app_secret: "service".into(),
        }],
        ..ApiConfig::default()
    }
}

fn test_app(dir: &TempDir) -> Router {
    let config = Arc::new(test_config(dir));
    let state = AppState::new(config.clone());
    app_router(&config, state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_req(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("token", token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("token", token)
        .body(Body::empty())
        .unwrap()
}

async fn issue_token(app: &Router) -> String {
    let (status, body) = send(app, get_req("/auth?app_key=blog&app_secret=service")).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_ok_without_auth() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let (status, body) = send(&app, get_req("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn auth_rejects_unknown_credentials() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = send(&app, get_req("/auth?app_key=blog&app_secret=nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 10000003);

    let (status, body) = send(&app, get_req("/auth")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 10000001);
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn api_requires_valid_token() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = send(&app, get_req("/api/v1/tags")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 10000001);

    let (status, body) = send(&app, authed("GET", "/api/v1/tags", "garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 10000004);

    let token = issue_token(&app).await;
    let (status, _) = send(&app, get_req(&format!("/api/v1/tags?token={token}"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn tag_crud_round_trip() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = issue_token(&app).await;

    let (status, created) = send(
        &app,
        json_req("POST", "/api/v1/tags", &token, json!({"name": "rust", "created_by": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["id"], 1);
    assert_eq!(created["state"], 1);

    let (status, list) = send(&app, authed("GET", "/api/v1/tags?page=1&page_size=5", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["list"].as_array().unwrap().len(), 1);
    assert_eq!(list["pager"]["total_rows"], 1);
    assert_eq!(list["pager"]["page_size"], 5);

    let (status, updated) = send(
        &app,
        json_req("PATCH", "/api/v1/tags/1/state", &token, json!({"state": 0, "modified_by": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["state"], 0);
    assert_eq!(updated["name"], "rust");

    let (status, list) = send(&app, authed("GET", "/api/v1/tags?state=0", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pager"]["total_rows"], 1);

    let (status, _) = send(&app, authed("DELETE", "/api/v1/tags/1", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, authed("DELETE", "/api/v1/tags/1", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 20010004);
}

#[tokio::test]
async fn validation_errors_follow_locale() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = issue_token(&app).await;

    let mut req = json_req("POST", "/api/v1/tags", &token, json!({"name": "r"}));
    req.headers_mut().insert("locale", "en".parse().unwrap());
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 10000001);
    let details: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap())
        .collect();
    assert_eq!(
        details,
        vec![
            "created_by must be between 2 and 100 characters in length",
            "name must be between 2 and 100 characters in length",
        ]
    );

    let req = json_req("POST", "/api/v1/tags", &token, json!({"name": "r", "created_by": "alice"}));
    let (_, body) = send(&app, req).await;
    assert_eq!(body["details"][0], "name长度必须在2到100个字符之间");
}

#[tokio::test]
async fn malformed_body_reports_no_details() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = issue_token(&app).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/tags")
        .header("token", &token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{oops"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 10000001);
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn invalid_path_id_fails_validation() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = issue_token(&app).await;

    let (status, body) = send(&app, authed("GET", "/api/v1/articles/abc", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn article_flow() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = issue_token(&app).await;

    let article = json!({
        "tag_id": 1,
        "title": "Hello Rust",
        "desc": "first post",
        "content": "content body",
        "cover_image_url": "https://example.com/cover.png",
        "created_by": "alice",
    });

    let (status, body) = send(&app, json_req("POST", "/api/v1/articles", &token, article.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 20020003);

    send(
        &app,
        json_req("POST", "/api/v1/tags", &token, json!({"name": "rust", "created_by": "alice"})),
    )
    .await;
    let (status, created) = send(&app, json_req("POST", "/api/v1/articles", &token, article)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["id"], 1);

    let (status, detail) = send(&app, authed("GET", "/api/v1/articles/1", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Hello Rust");
    assert_eq!(detail["tag"]["name"], "rust");

    let (status, list) = send(&app, authed("GET", "/api/v1/articles?tag_id=1", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pager"]["total_rows"], 1);

    let (status, updated) = send(
        &app,
        json_req("PUT", "/api/v1/articles/1", &token, json!({"title": "Renamed", "modified_by": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["content"], "content body");

    let (status, _) = send(&app, authed("DELETE", "/api/v1/articles/1", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, authed("GET", "/api/v1/articles/1", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn article_list_requires_tag_id() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = issue_token(&app).await;

    let (status, body) = send(&app, authed("GET", "/api/v1/articles", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn auth_is_rate_limited_after_burst() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    for _ in 0..10 {
        let (status, _) = send(&app, get_req("/auth?app_key=blog&app_secret=service")).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, get_req("/auth?app_key=blog&app_secret=service")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], 10000007);

    // 其他路由不受 /auth 规则影响
    let (status, _) = send(&app, get_req("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

fn multipart_req(token: &str, file_type: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    let boundary = "XBLOGBOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"type\"\r\n\r\n{file_type}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload/file")
        .header("token", token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn upload_saves_and_serves_file() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = issue_token(&app).await;

    let (status, body) = send(&app, multipart_req(&token, "1", "cover.png", b"png-bytes")).await;
    assert_eq!(status, StatusCode::OK);
    let file_name = UploadPolicy::file_name("cover.png");
    assert_eq!(
        body["file_access_url"],
        format!("http://127.0.0.1:8000/static/{file_name}")
    );

    let response = app
        .clone()
        .oneshot(get_req(&format!("/static/{file_name}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"png-bytes");
}

#[tokio::test]
async fn upload_rejects_bad_input() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = issue_token(&app).await;

    let (status, body) = send(&app, multipart_req(&token, "1", "script.exe", b"x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 20030001);

    let (status, body) = send(&app, multipart_req(&token, "9", "cover.png", b"x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 10000001);

    let oversize = vec![0u8; 1024 * 1024 + 10];
    let (status, body) = send(&app, multipart_req(&token, "1", "big.png", &oversize)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 20030001);
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = issue_token(&app).await;

    let (status, body) = send(&app, authed("GET", "/nope", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10000002);
}

async fn boom() -> &'static str {
    panic!("boom")
}

#[tokio::test]
async fn release_mode_uses_custom_recovery() {
    let router = super::router::with_request_logging(Router::new().route("/boom", get(boom)), RunMode::Release);
    let response = router.oneshot(get_req("/boom")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], 10000000);
}

#[tokio::test]
async fn debug_mode_uses_generic_recovery() {
    let router = super::router::with_request_logging(Router::new().route("/boom", get(boom)), RunMode::Debug);
    let response = router.oneshot(get_req("/boom")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_ne!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"application/json"[..])
    );
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_millis(500)).await;
    "late"
}

#[tokio::test]
async fn slow_request_times_out() {
    let dir = TempDir::new().unwrap();
    let config = ApiConfig {
        context_timeout: Duration::from_millis(20),
        ..test_config(&dir)
    };
    let state = AppState::new(Arc::new(config.clone()));
    let router = Router::new()
        .route("/health", get(slow))
        .route("/health/fast", get(|| async { "ok" }));
    let app = super::router::with_middleware(router, &config, state);

    let response = app.clone().oneshot(get_req("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    // 受 jwt 保护的路径仍需 token，超时层不影响正常请求
    let response = app.oneshot(get_req("/health/fast")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn debug_mode_app_serves_full_stack() {
    let dir = TempDir::new().unwrap();
    let config = Arc::new(ApiConfig {
        run_mode: RunMode::Debug,
        ..test_config(&dir)
    });
    let app = app_router(&config, AppState::new(config.clone()));

    let (status, _) = send(&app, get_req("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let token = issue_token(&app).await;
    let (status, body) = send(&app, authed("GET", "/api/v1/tags", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pager"]["total_rows"], 0);

    let (status, body) = send(&app, get_req("/api/v1/tags")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 10000001);
}

#[tokio::test]
async fn debug_mode_panic_through_middleware_is_generic() {
    let dir = TempDir::new().unwrap();
    let config = ApiConfig {
        run_mode: RunMode::Debug,
        ..test_config(&dir)
    };
    let state = AppState::new(Arc::new(config.clone()));
    let router = super::router::with_middleware(Router::new().route("/health", get(boom)), &config, state);
    let app = super::router::with_request_logging(router, config.run_mode);

    let response = app.oneshot(get_req("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_ne!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"application/json"[..])
    );
}
