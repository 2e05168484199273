use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use blog_core::BlogError;
use serde::Serialize;
use utoipa::ToSchema;

/// 公共错误码
pub mod code {
    pub const SERVER_ERROR: u32 = 10000000;
    pub const INVALID_PARAMS: u32 = 10000001;
    pub const NOT_FOUND: u32 = 10000002;
    pub const UNAUTHORIZED_AUTH_NOT_EXIST: u32 = 10000003;
    pub const UNAUTHORIZED_TOKEN_ERROR: u32 = 10000004;
    pub const UNAUTHORIZED_TOKEN_TIMEOUT: u32 = 10000005;
    pub const UNAUTHORIZED_TOKEN_GENERATE: u32 = 10000006;
    pub const TOO_MANY_REQUESTS: u32 = 10000007;

    pub const GET_TAG_LIST_FAIL: u32 = 20010001;
    pub const CREATE_TAG_FAIL: u32 = 20010002;
    pub const UPDATE_TAG_FAIL: u32 = 20010003;
    pub const DELETE_TAG_FAIL: u32 = 20010004;
    pub const COUNT_TAG_FAIL: u32 = 20010005;

    pub const GET_ARTICLE_FAIL: u32 = 20020001;
    pub const GET_ARTICLES_FAIL: u32 = 20020002;
    pub const CREATE_ARTICLE_FAIL: u32 = 20020003;
    pub const UPDATE_ARTICLE_FAIL: u32 = 20020004;
    pub const DELETE_ARTICLE_FAIL: u32 = 20020005;

    pub const UPLOAD_FILE_FAIL: u32 = 20030001;
}

/// 统一错误响应体
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: u32,
    pub msg: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

#[derive(Debug)]
pub struct ApiError {
    code: u32,
    message: String,
    details: Vec<String>,
    status: StatusCode,
}

impl ApiError {
    pub fn new(code: u32, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    #[cfg(test)]
    pub fn code(&self) -> u32 {
        self.code
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn server_error() -> Self {
        Self::new(code::SERVER_ERROR, StatusCode::INTERNAL_SERVER_ERROR, "服务内部错误")
    }

    pub fn invalid_params() -> Self {
        Self::new(code::INVALID_PARAMS, StatusCode::BAD_REQUEST, "入参错误")
    }

    pub fn not_found() -> Self {
        Self::new(code::NOT_FOUND, StatusCode::NOT_FOUND, "找不到")
    }

    pub fn auth_not_exist() -> Self {
        Self::new(
            code::UNAUTHORIZED_AUTH_NOT_EXIST,
            StatusCode::UNAUTHORIZED,
            "鉴权失败，找不到对应的 AppKey 和 AppSecret",
        )
    }

    pub fn token_error() -> Self {
        Self::new(
            code::UNAUTHORIZED_TOKEN_ERROR,
            StatusCode::UNAUTHORIZED,
            "鉴权失败，Token 错误",
        )
    }

    pub fn token_timeout() -> Self {
        Self::new(
            code::UNAUTHORIZED_TOKEN_TIMEOUT,
            StatusCode::UNAUTHORIZED,
            "鉴权失败，Token 超时",
        )
    }

    pub fn token_generate() -> Self {
        Self::new(
            code::UNAUTHORIZED_TOKEN_GENERATE,
            StatusCode::INTERNAL_SERVER_ERROR,
            "鉴权失败，Token 生成失败",
        )
    }

    pub fn too_many_requests() -> Self {
        Self::new(
            code::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
            "请求过多",
        )
    }

    /// 业务模块错误：NotFound 仍映射为 404，参数错误映射为 400，其余为 500
    pub fn module(code: u32, message: &str, err: BlogError) -> Self {
        let status = match err {
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_client_error() {
            tracing::warn!(code, error = %err, "{message}");
        } else {
            tracing::error!(code, error = %err, "{message}");
        }
        Self::new(code, status, message).with_details(vec![err.to_string()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            code: self.code,
            msg: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_errors_keep_code_and_map_status() {
        let err = ApiError::module(code::DELETE_TAG_FAIL, "删除标签失败", BlogError::NotFound("tag 1".into()));
        assert_eq!(err.code(), code::DELETE_TAG_FAIL);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::module(code::UPLOAD_FILE_FAIL, "上传文件失败", BlogError::InvalidArgument("bad".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.details, vec!["invalid argument: bad".to_string()]);

        let err = ApiError::module(code::CREATE_TAG_FAIL, "创建标签失败", BlogError::Other("disk".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
