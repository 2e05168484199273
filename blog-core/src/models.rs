//! 博客数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

/// 状态：禁用
pub const STATE_DISABLED: u8 = 0;
/// 状态：启用
pub const STATE_ENABLED: u8 = 1;

/// 标签（存储模型）
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    pub id: u32,
    pub name: String,
    /// 0 禁用，1 启用
    pub state: u8,
    pub created_by: String,
    #[serde(default)]
    pub modified_by: String,
    pub created_on: DateTime<Utc>,
    pub modified_on: Option<DateTime<Utc>>,
}

/// 文章（存储模型）
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Article {
    pub id: u32,
    pub tag_id: u32,
    pub title: String,
    pub desc: String,
    pub content: String,
    pub cover_image_url: String,
    pub state: u8,
    pub created_by: String,
    #[serde(default)]
    pub modified_by: String,
    pub created_on: DateTime<Utc>,
    pub modified_on: Option<DateTime<Utc>>,
}

/// 文章详情：附带所属标签
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    pub tag: Option<Tag>,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub state: u8,
    pub created_by: String,
}

/// 标签更新；`None` 表示保持不变
#[derive(Debug, Clone, Default)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub state: Option<u8>,
    pub modified_by: String,
}

#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    /// 名称子串匹配，空串不过滤
    pub name: Option<String>,
    pub state: Option<u8>,
}

impl TagFilter {
    pub(crate) fn matches(&self, tag: &Tag) -> bool {
        let name_ok = match self.name.as_deref() {
            Some(name) if !name.is_empty() => tag.name.contains(name),
            _ => true,
        };
        let state_ok = self.state.map_or(true, |s| tag.state == s);
        name_ok && state_ok
    }
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub tag_id: u32,
    pub title: String,
    pub desc: String,
    pub content: String,
    pub cover_image_url: String,
    pub state: u8,
    pub created_by: String,
}

/// 文章更新；`None` 表示保持不变
#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
    pub tag_id: Option<u32>,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub content: Option<String>,
    pub cover_image_url: Option<String>,
    pub state: Option<u8>,
    pub modified_by: String,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub tag_id: Option<u32>,
    pub state: Option<u8>,
}

impl ArticleFilter {
    pub(crate) fn matches(&self, article: &Article) -> bool {
        self.tag_id.map_or(true, |t| article.tag_id == t)
            && self.state.map_or(true, |s| article.state == s)
    }
}
