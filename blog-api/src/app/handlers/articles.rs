//! 文章 API handlers

use axum::extract::{Path, Request, State};
use axum::Json;
use blog_core::{
    Article, ArticleDetail, ArticleFilter, ArticleUpdate, NewArticle, STATE_ENABLED,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;
use validator::Validate;

use super::path_id;
use crate::app::error::{code, ApiError};
use crate::app::form::{bind_and_valid, bind_and_valid_with};
use crate::app::pagination::Pager;
use crate::app::AppState;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ArticleRequest {
    #[serde(skip)]
    #[validate(range(min = 1))]
    pub id: u32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ArticleListRequest {
    #[validate(range(min = 1))]
    pub tag_id: u32,
    #[validate(range(max = 1))]
    pub state: u8,
}

impl Default for ArticleListRequest {
    fn default() -> Self {
        Self {
            tag_id: 0,
            state: STATE_ENABLED,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateArticleRequest {
    #[validate(range(min = 1))]
    pub tag_id: u32,
    #[validate(length(min = 2, max = 100))]
    pub title: String,
    #[validate(length(min = 2, max = 255))]
    pub desc: String,
    #[validate(length(min = 1, code = "required"))]
    pub content: String,
    #[validate(url)]
    pub cover_image_url: String,
    #[validate(length(min = 2, max = 100))]
    pub created_by: String,
    #[validate(range(max = 1))]
    pub state: u8,
}

impl Default for CreateArticleRequest {
    fn default() -> Self {
        Self {
            tag_id: 0,
            title: String::new(),
            desc: String::new(),
            content: String::new(),
            cover_image_url: String::new(),
            created_by: String::new(),
            state: STATE_ENABLED,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateArticleRequest {
    #[serde(skip)]
    #[validate(range(min = 1))]
    pub id: u32,
    #[validate(range(min = 1))]
    pub tag_id: Option<u32>,
    #[validate(length(min = 2, max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 2, max = 255))]
    pub desc: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(url)]
    pub cover_image_url: Option<String>,
    #[validate(range(max = 1))]
    pub state: Option<u8>,
    #[validate(length(min = 2, max = 100))]
    pub modified_by: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleList {
    pub list: Vec<Article>,
    pub pager: Pager,
}

/// GET /api/v1/articles/:id - 获取单篇文章
#[utoipa::path(
    get,
    path = "/api/v1/articles/{id}",
    tag = "articles",
    params(("id" = u32, Path, description = "文章 ID")),
    responses(
        (status = 200, description = "成功", body = ArticleDetail),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
        (status = 404, description = "文章不存在", body = crate::app::error::ErrorBody),
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Request,
) -> Result<Json<ArticleDetail>, ApiError> {
    let id = path_id(&id);
    let param = bind_and_valid_with::<ArticleRequest, _>(req, |p| p.id = id)
        .await
        .into_result()?;
    let detail = state
        .store
        .get_article(param.id)
        .await
        .map_err(|e| ApiError::module(code::GET_ARTICLE_FAIL, "获取单个文章失败", e))?;
    Ok(Json(detail))
}

/// GET /api/v1/articles - 获取多篇文章
#[utoipa::path(
    get,
    path = "/api/v1/articles",
    tag = "articles",
    params(
        ("tag_id" = u32, Query, description = "标签 ID"),
        ("state" = Option<u8>, Query, description = "状态"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("page_size" = Option<u32>, Query, description = "每页数量"),
    ),
    responses(
        (status = 200, description = "成功", body = ArticleList),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
    )
)]
pub async fn list_articles(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<ArticleList>, ApiError> {
    let pager = Pager::from_uri(req.uri(), &state.config);
    let param = bind_and_valid::<ArticleListRequest>(req).await.into_result()?;

    let filter = ArticleFilter {
        tag_id: Some(param.tag_id),
        state: Some(param.state),
    };
    let fail = |e| ApiError::module(code::GET_ARTICLES_FAIL, "获取多个文章失败", e);
    let total = state.store.count_articles(&filter).await.map_err(fail)?;
    let list = state
        .store
        .list_articles(&filter, pager.offset(), pager.limit())
        .await
        .map_err(fail)?;

    Ok(Json(ArticleList {
        list,
        pager: pager.with_total(total),
    }))
}

/// POST /api/v1/articles - 创建文章
#[utoipa::path(
    post,
    path = "/api/v1/articles",
    tag = "articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 200, description = "成功", body = Article),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
        (status = 404, description = "标签不存在", body = crate::app::error::ErrorBody),
    )
)]
pub async fn create_article(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<Article>, ApiError> {
    let param = bind_and_valid::<CreateArticleRequest>(req).await.into_result()?;
    let article = state
        .store
        .create_article(NewArticle {
            tag_id: param.tag_id,
            title: param.title,
            desc: param.desc,
            content: param.content,
            cover_image_url: param.cover_image_url,
            state: param.state,
            created_by: param.created_by,
        })
        .await
        .map_err(|e| ApiError::module(code::CREATE_ARTICLE_FAIL, "创建文章失败", e))?;
    Ok(Json(article))
}

/// PUT /api/v1/articles/:id 与 PATCH /api/v1/articles/:id/state - 更新文章
#[utoipa::path(
    put,
    path = "/api/v1/articles/{id}",
    tag = "articles",
    params(("id" = u32, Path, description = "文章 ID")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "成功", body = Article),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
        (status = 404, description = "文章不存在", body = crate::app::error::ErrorBody),
    )
)]
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Request,
) -> Result<Json<Article>, ApiError> {
    let id = path_id(&id);
    let param = bind_and_valid_with::<UpdateArticleRequest, _>(req, |p| p.id = id)
        .await
        .into_result()?;
    let article = state
        .store
        .update_article(
            param.id,
            ArticleUpdate {
                tag_id: param.tag_id,
                title: param.title,
                desc: param.desc,
                content: param.content,
                cover_image_url: param.cover_image_url,
                state: param.state,
                modified_by: param.modified_by,
            },
        )
        .await
        .map_err(|e| ApiError::module(code::UPDATE_ARTICLE_FAIL, "更新文章失败", e))?;
    Ok(Json(article))
}

/// DELETE /api/v1/articles/:id - 删除文章
#[utoipa::path(
    delete,
    path = "/api/v1/articles/{id}",
    tag = "articles",
    params(("id" = u32, Path, description = "文章 ID")),
    responses(
        (status = 200, description = "成功"),
        (status = 400, description = "请求错误", body = crate::app::error::ErrorBody),
        (status = 404, description = "文章不存在", body = crate::app::error::ErrorBody),
    )
)]
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Request,
) -> Result<Json<Value>, ApiError> {
    let id = path_id(&id);
    let param = bind_and_valid_with::<ArticleRequest, _>(req, |p| p.id = id)
        .await
        .into_result()?;
    state
        .store
        .delete_article(param.id)
        .await
        .map_err(|e| ApiError::module(code::DELETE_ARTICLE_FAIL, "删除文章失败", e))?;
    Ok(Json(json!({})))
}
