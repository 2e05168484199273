use axum::extract::ConnectInfo;
use axum::http::Uri;
use axum::Json;
use serde_json::json;
use std::net::SocketAddr;

use crate::app::error::ApiError;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// 处理 404 错误，记录可疑请求
pub async fn handler_404(uri: Uri, connect_info: Option<ConnectInfo<SocketAddr>>) -> ApiError {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    tracing::warn!(path = %uri.path(), ip = %ip, "404 request");

    ApiError::not_found()
}
