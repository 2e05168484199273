//! 请求绑定与参数校验

use axum::extract::{FromRequest, Query, Request};
use axum::http::{header, Method};
use axum::{Form, Json};
use blog_core::{Translator, ValidErrors};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::error::ApiError;

/// 绑定结果
#[derive(Debug)]
pub enum BindOutcome<T> {
    Success(T),
    /// 结构化校验失败，已按请求语言翻译
    ValidationFailure(ValidErrors),
    /// 请求体无法解析，或缺少翻译器；不附带细节
    MalformedInput,
}

impl<T> BindOutcome<T> {
    pub fn is_failed(&self) -> bool {
        !matches!(self, BindOutcome::Success(_))
    }

    /// 转换为 handler 可直接 `?` 的结果
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            BindOutcome::Success(value) => Ok(value),
            BindOutcome::ValidationFailure(errs) => {
                tracing::warn!(errs = %errs, "bind_and_valid failed");
                Err(ApiError::invalid_params().with_details(errs.errors()))
            }
            BindOutcome::MalformedInput => {
                tracing::warn!("bind_and_valid failed: malformed input");
                Err(ApiError::invalid_params())
            }
        }
    }
}

pub async fn bind_and_valid<T>(req: Request) -> BindOutcome<T>
where
    T: DeserializeOwned + Validate,
{
    bind_and_valid_with(req, |_| {}).await
}

/// 绑定后、校验前调用 `prepare`，用于写入路径参数等
pub async fn bind_and_valid_with<T, F>(req: Request, prepare: F) -> BindOutcome<T>
where
    T: DeserializeOwned + Validate,
    F: FnOnce(&mut T),
{
    let translator = req.extensions().get::<Translator>().copied();

    let Some(mut value) = decode::<T>(req).await else {
        return BindOutcome::MalformedInput;
    };
    prepare(&mut value);

    match value.validate() {
        Ok(()) => BindOutcome::Success(value),
        Err(errors) => match translator {
            Some(translator) => BindOutcome::ValidationFailure(translator.translate(&errors)),
            None => BindOutcome::MalformedInput,
        },
    }
}

/// 按 method 与 Content-Type 选择解码方式
async fn decode<T: DeserializeOwned>(req: Request) -> Option<T> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase());

    let bodyless = matches!(*req.method(), Method::GET | Method::HEAD | Method::DELETE);

    match content_type.as_deref() {
        Some(ct) if ct.starts_with("application/json") => Json::<T>::from_request(req, &())
            .await
            .map(|Json(v)| v)
            .ok(),
        _ if bodyless || content_type.is_none() => Query::<T>::try_from_uri(req.uri())
            .map(|Query(v)| v)
            .ok(),
        _ => Form::<T>::from_request(req, &()).await.map(|Form(v)| v).ok(),
    }
}
