//! 标签 API handlers

use axum::extract::{Path, Request, State};
use axum::Json;
use blog_core::{NewTag, Tag, TagFilter, TagUpdate, STATE_ENABLED};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;
use validator::Validate;

use super::path_id;
use crate::app::error::{code, ApiError};
use crate::app::form::{bind_and_valid, bind_and_valid_with};
use crate::app::pagination::Pager;
use crate::app::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct TagListRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(range(max = 1))]
    pub state: u8,
}

impl Default for TagListRequest {
    fn default() -> Self {
        Self {
            name: None,
            state: STATE_ENABLED,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateTagRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(min = 2, max = 100))]
    pub created_by: String,
    #[validate(range(max = 1))]
    pub state: u8,
}

impl Default for CreateTagRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            created_by: String::new(),
            state: STATE_ENABLED,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateTagRequest {
    #[serde(skip)]
    #[validate(range(min = 1))]
    pub id: u32,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(range(max = 1))]
    pub state: Option<u8>,
    #[validate(length(min = 2, max = 100))]
    pub modified_by: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct DeleteTagRequest {
    #[serde(skip)]
    #[validate(range(min = 1))]
    pub id: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TagList {
    pub list: Vec<Tag>,
    pub pager: Pager,
}

/// GET /api/v1/tags - 获取多个标签
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    tag = "tags",
    params(
        ("name" = Option<String>, Query, description = "标签名称"),
        ("state" = Option<u8>, Query, description = "状态 0 禁用 1 启用"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("page_size" = Option<u32>, Query, description = "每页数量"),
    ),
    responses(
        (status = 200, description = "成功", body = TagList),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
        (status = 500, description = "内部错误", body = crate::app::error::ErrorBody),
    )
)]
pub async fn list_tags(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<TagList>, ApiError> {
    let pager = Pager::from_uri(req.uri(), &state.config);
    let param = bind_and_valid::<TagListRequest>(req).await.into_result()?;

    let filter = TagFilter {
        name: param.name,
        state: Some(param.state),
    };
    let total = state
        .store
        .count_tags(&filter)
        .await
        .map_err(|e| ApiError::module(code::COUNT_TAG_FAIL, "统计标签失败", e))?;
    let list = state
        .store
        .list_tags(&filter, pager.offset(), pager.limit())
        .await
        .map_err(|e| ApiError::module(code::GET_TAG_LIST_FAIL, "获取标签列表失败", e))?;

    Ok(Json(TagList {
        list,
        pager: pager.with_total(total),
    }))
}

/// POST /api/v1/tags - 新增标签
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    tag = "tags",
    request_body = CreateTagRequest,
    responses(
        (status = 200, description = "成功", body = Tag),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
        (status = 500, description = "内部错误", body = crate::app::error::ErrorBody),
    )
)]
pub async fn create_tag(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<Tag>, ApiError> {
    let param = bind_and_valid::<CreateTagRequest>(req).await.into_result()?;
    let tag = state
        .store
        .create_tag(NewTag {
            name: param.name,
            state: param.state,
            created_by: param.created_by,
        })
        .await
        .map_err(|e| ApiError::module(code::CREATE_TAG_FAIL, "创建标签失败", e))?;
    Ok(Json(tag))
}

/// PUT /api/v1/tags/:id 与 PATCH /api/v1/tags/:id/state - 更新标签
#[utoipa::path(
    put,
    path = "/api/v1/tags/{id}",
    tag = "tags",
    params(("id" = u32, Path, description = "标签 ID")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "成功", body = Tag),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
        (status = 404, description = "标签不存在", body = crate::app::error::ErrorBody),
    )
)]
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Request,
) -> Result<Json<Tag>, ApiError> {
    let id = path_id(&id);
    let param = bind_and_valid_with::<UpdateTagRequest, _>(req, |p| p.id = id)
        .await
        .into_result()?;
    let tag = state
        .store
        .update_tag(
            param.id,
            TagUpdate {
                name: param.name,
                state: param.state,
                modified_by: param.modified_by,
            },
        )
        .await
        .map_err(|e| ApiError::module(code::UPDATE_TAG_FAIL, "更新标签失败", e))?;
    Ok(Json(tag))
}

/// DELETE /api/v1/tags/:id - 删除标签
#[utoipa::path(
    delete,
    path = "/api/v1/tags/{id}",
    tag = "tags",
    params(("id" = u32, Path, description = "标签 ID")),
    responses(
        (status = 200, description = "成功"),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
        (status = 404, description = "标签不存在", body = crate::app::error::ErrorBody),
    )
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Request,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(&id);
    let param = bind_and_valid_with::<DeleteTagRequest, _>(req, |p| p.id = id)
        .await
        .into_result()?;
    state
        .store
        .delete_tag(param.id)
        .await
        .map_err(|e| ApiError::module(code::DELETE_TAG_FAIL, "删除标签失败", e))?;
    Ok(Json(json!({})))
}
