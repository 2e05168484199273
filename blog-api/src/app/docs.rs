use blog_core::{Article, ArticleDetail, Tag};
use utoipa::OpenApi;

use super::error::ErrorBody;
use super::handlers::{articles, auth, tags, upload};
use super::pagination::Pager;

#[derive(OpenApi)]
#[openapi(
    info(title = "blog-service", description = "博客后端 API"),
    paths(
        auth::get_auth,
        upload::upload_file,
        tags::list_tags,
        tags::create_tag,
        tags::update_tag,
        tags::delete_tag,
        articles::get_article,
        articles::list_articles,
        articles::create_article,
        articles::update_article,
        articles::delete_article,
    ),
    components(schemas(
        Tag,
        Article,
        ArticleDetail,
        Pager,
        ErrorBody,
        auth::TokenResponse,
        upload::UploadResponse,
        tags::TagList,
        tags::TagListRequest,
        tags::CreateTagRequest,
        tags::UpdateTagRequest,
        articles::ArticleList,
        articles::ArticleListRequest,
        articles::CreateArticleRequest,
        articles::UpdateArticleRequest,
    )),
    tags(
        (name = "auth", description = "鉴权"),
        (name = "upload", description = "文件上传"),
        (name = "tags", description = "标签管理"),
        (name = "articles", description = "文章管理"),
    ),
)]
pub struct ApiDoc;
