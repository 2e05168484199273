use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use blog_core::{BlogError, Locale, TokenClaims, Translator};

use super::error::ApiError;
use super::rate_limit::MethodLimiter;
use super::state::AppState;

/// 认证信息扩展
#[derive(Debug, Clone)]
pub struct AuthInfo {
	pub claims: TokenClaims,
}

/// 不需要认证的路径
const PUBLIC_PATHS: &[&str] = &["/health", "/auth"];
/// 不需要认证的路径前缀（文档与静态资源）
const PUBLIC_PREFIXES: &[&str] = &["/swapper", "/api-docs", "/static"];

fn is_public(path: &str) -> bool {
	PUBLIC_PATHS.iter().any(|p| path == *p)
		|| PUBLIC_PREFIXES
			.iter()
			.any(|p| path == *p || path.starts_with(&format!("{p}/")))
}

/// 从请求中提取 token：`token` header > Authorization Bearer > query param
fn extract_token(request: &Request<Body>) -> Option<String> {
	let headers = request.headers();
	if let Some(token) = headers
		.get("token")
		.and_then(|v| v.to_str().ok())
		.filter(|v| !v.is_empty())
	{
		return Some(token.to_string());
	}

	if let Some(token) = headers
		.get(axum::http::header::AUTHORIZATION)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.strip_prefix("Bearer "))
	{
		return Some(token.to_string());
	}

	request.uri().query().and_then(|query| {
		query.split('&').find_map(|pair| {
			let (key, value) = pair.split_once('=')?;
			if key == "token" && !value.is_empty() {
				urlencoding::decode(value).ok().map(|s| s.into_owned())
			} else {
				None
			}
		})
	})
}

/// 从请求中提取客户端 IP
/// 优先级：X-Real-IP > X-Forwarded-For（第一个） > Socket Address
fn extract_client_ip(request: &Request<Body>) -> String {
	if let Some(real_ip) = request
		.headers()
		.get("X-Real-IP")
		.and_then(|v| v.to_str().ok())
	{
		return real_ip.to_string();
	}

	if let Some(forwarded) = request
		.headers()
		.get("X-Forwarded-For")
		.and_then(|v| v.to_str().ok())
	{
		if let Some(first_ip) = forwarded.split(',').next().map(|s| s.trim()) {
			if !first_ip.is_empty() {
				return first_ip.to_string();
			}
		}
	}

	request
		.extensions()
		.get::<ConnectInfo<SocketAddr>>()
		.map(|ci| ci.0.ip().to_string())
		.unwrap_or_else(|| "unknown".to_string())
}

/// 访问日志（非 debug 模式）
pub async fn access_log(request: Request<Body>, next: Next) -> Response {
	let started = Instant::now();
	let method = request.method().clone();
	let path = request.uri().path().to_string();
	let query = request.uri().query().unwrap_or_default().to_string();
	let client_ip = extract_client_ip(&request);

	let response = next.run(request).await;

	tracing::info!(
		target: "access_log",
		method = %method,
		path = %path,
		query = %query,
		status = response.status().as_u16(),
		client_ip = %client_ip,
		latency_ms = started.elapsed().as_millis() as u64,
		"access log"
	);
	response
}

/// panic 恢复（非 debug 模式）：记录 panic 信息并返回统一错误体
pub fn recover_panic(err: Box<dyn Any + Send + 'static>) -> Response {
	let detail = if let Some(s) = err.downcast_ref::<String>() {
		s.clone()
	} else if let Some(s) = err.downcast_ref::<&str>() {
		s.to_string()
	} else {
		"unknown panic".to_string()
	};
	tracing::error!(panic = %detail, "panic recovered");
	ApiError::server_error().into_response()
}

/// 按路由前缀限流
pub async fn rate_limit(
	State(limiter): State<Arc<MethodLimiter>>,
	request: Request<Body>,
	next: Next,
) -> Result<Response, ApiError> {
	if let Some(key) = limiter.key(request.uri().path()) {
		if !limiter.allow(key).await {
			tracing::warn!(key = %key, client_ip = %extract_client_ip(&request), "rate limit exceeded");
			return Err(ApiError::too_many_requests());
		}
	}
	Ok(next.run(request).await)
}

/// 根据 `locale` header 注入校验翻译器
pub async fn translations(mut request: Request<Body>, next: Next) -> Response {
	let locale = Locale::from_header(request.headers().get("locale").and_then(|v| v.to_str().ok()));
	request.extensions_mut().insert(Translator::new(locale));
	next.run(request).await
}

pub async fn jwt(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Result<Response, ApiError> {
	if is_public(request.uri().path()) {
		return Ok(next.run(request).await);
	}

	let Some(token) = extract_token(&request) else {
		return Err(ApiError::invalid_params());
	};

	let claims = match state.tokens.parse_token(&token) {
		Ok(c) => c,
		Err(BlogError::TokenExpired) => return Err(ApiError::token_timeout()),
		Err(_) => return Err(ApiError::token_error()),
	};

	request.extensions_mut().insert(AuthInfo { claims });
	Ok(next.run(request).await)
}
