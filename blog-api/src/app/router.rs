use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::docs::ApiDoc;
use super::handlers::{
    create_article, create_tag, delete_article, delete_tag, get_article, get_auth, handler_404,
    health, list_articles, list_tags, update_article, update_tag, upload_file,
};
use super::middleware::{access_log, jwt, rate_limit, recover_panic, translations};
use super::rate_limit::{LimitBucketRule, MethodLimiter};
use super::state::AppState;
use crate::config::{ApiConfig, RunMode};

/// 限流规则：/auth 每秒补充 10 个令牌，容量 10
fn method_limiter() -> MethodLimiter {
    MethodLimiter::new().add_buckets([LimitBucketRule {
        key: "/auth".into(),
        fill_interval: Duration::from_secs(1),
        capacity: 10,
        quantum: 10,
    }])
}

/// debug 模式使用通用的 TraceLayer + CatchPanicLayer，其余模式使用自定义访问日志与恢复，二者互斥
pub(super) fn with_request_logging(router: Router, mode: RunMode) -> Router {
    match mode {
        RunMode::Debug => router
            .layer(CatchPanicLayer::new())
            .layer(TraceLayer::new_for_http()),
        RunMode::Release | RunMode::Test => router
            .layer(CatchPanicLayer::custom(recover_panic))
            .layer(from_fn(access_log)),
    }
}

/// 业务中间件，后添加的 layer 先执行：rate_limit -> timeout -> translations -> jwt
pub(super) fn with_middleware(router: Router, config: &ApiConfig, state: AppState) -> Router {
    let limiter = Arc::new(method_limiter());
    router
        .layer(from_fn_with_state(state, jwt))
        .layer(from_fn(translations))
        .layer(TimeoutLayer::new(config.context_timeout))
        .layer(from_fn_with_state(limiter, rate_limit))
}

/// Build the router with routes and middleware wired.
pub fn app_router(config: &ApiConfig, state: AppState) -> Router {
    let upload_routes = Router::new()
        .route("/upload/file", post(upload_file))
        .layer(DefaultBodyLimit::max(state.upload.body_limit()));

    let api_v1 = Router::new()
        .route("/tags", post(create_tag).get(list_tags))
        .route("/tags/:id", delete(delete_tag).put(update_tag))
        .route("/tags/:id/state", patch(update_tag))
        .route("/articles", post(create_article).get(list_articles))
        .route(
            "/articles/:id",
            delete(delete_article)
                .put(update_article)
                .get(get_article),
        )
        .route("/articles/:id/state", patch(update_article));

    let router = Router::new()
        .route("/health", get(health))
        .route("/auth", get(get_auth))
        .merge(upload_routes)
        .nest("/api/v1", api_v1)
        .nest_service("/static", ServeDir::new(&config.upload_save_path))
        .fallback(handler_404)
        .with_state(state.clone())
        .merge(SwaggerUi::new("/swapper").url("/api-docs/openapi.json", ApiDoc::openapi()));

    with_request_logging(with_middleware(router, config, state), config.run_mode)
}
