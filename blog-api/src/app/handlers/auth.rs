//! 认证相关 API handlers

use axum::extract::{Request, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::app::error::ApiError;
use crate::app::form::bind_and_valid;
use crate::app::AppState;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AuthRequest {
    #[validate(length(min = 1, code = "required"))]
    pub app_key: String,
    #[validate(length(min = 1, code = "required"))]
    pub app_secret: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// GET /auth - 使用 app_key / app_secret 换取 token
#[utoipa::path(
    get,
    path = "/auth",
    tag = "auth",
    params(
        ("app_key" = String, Query, description = "应用 key"),
        ("app_secret" = String, Query, description = "应用 secret"),
    ),
    responses(
        (status = 200, description = "成功", body = TokenResponse),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
        (status = 401, description = "鉴权失败", body = crate::app::error::ErrorBody),
        (status = 429, description = "请求过多", body = crate::app::error::ErrorBody),
    )
)]
pub async fn get_auth(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<TokenResponse>, ApiError> {
    let param = bind_and_valid::<AuthRequest>(req).await.into_result()?;

    if !state.tokens.check_auth(&param.app_key, &param.app_secret) {
        tracing::warn!(app_key = %param.app_key, "auth rejected: unknown credentials");
        return Err(ApiError::auth_not_exist());
    }

    let token = state.tokens.generate_token(&param.app_key).map_err(|e| {
        tracing::error!(error = %e, "generate token failed");
        ApiError::token_generate()
    })?;

    Ok(Json(TokenResponse { token }))
}
