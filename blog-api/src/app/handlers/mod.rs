pub mod articles;
pub mod auth;
pub mod health;
pub mod tags;
pub mod upload;

pub use articles::{create_article, delete_article, get_article, list_articles, update_article};
pub use auth::get_auth;
pub use health::{handler_404, health};
pub use tags::{create_tag, delete_tag, list_tags, update_tag};
pub use upload::upload_file;

/// 路径中的 id；无法解析时为 0，交给校验规则报错
pub(crate) fn path_id(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}
