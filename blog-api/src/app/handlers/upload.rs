//! 文件上传 handler

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use blog_core::FileType;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::error::{code, ApiError};
use crate::app::middleware::AuthInfo;
use crate::app::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub file_access_url: String,
}

/// POST /upload/file - 上传文件（multipart：type + file）
#[utoipa::path(
    post,
    path = "/upload/file",
    tag = "upload",
    request_body(content = String, content_type = "multipart/form-data", description = "type=1 表示图片，file 为文件内容"),
    responses(
        (status = 200, description = "成功", body = UploadResponse),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthInfo>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!(error = %e, "upload rejected: not a multipart request");
        ApiError::invalid_params().with_details(vec![e.body_text()])
    })?;

    let mut file_type: Option<u8> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_params().with_details(vec![e.body_text()]))?
    {
        match field.name() {
            Some("type") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::invalid_params().with_details(vec![e.body_text()]))?;
                file_type = text.trim().parse().ok();
            }
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::invalid_params().with_details(vec![e.body_text()]))?;
                file = Some((name, data.to_vec()));
            }
            _ => {}
        }
    }

    let file_type = file_type
        .and_then(FileType::from_code)
        .ok_or_else(|| ApiError::invalid_params().with_details(vec!["file type is invalid".into()]))?;
    let (name, data) = file
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| ApiError::invalid_params().with_details(vec!["file is required".into()]))?;

    let file_access_url = state
        .upload
        .save_file(file_type, &name, &data)
        .await
        .map_err(|e| ApiError::module(code::UPLOAD_FILE_FAIL, "上传文件失败", e))?;

    tracing::info!(app_key = %auth.claims.app_key, url = %file_access_url, "file saved");
    Ok(Json(UploadResponse { file_access_url }))
}
