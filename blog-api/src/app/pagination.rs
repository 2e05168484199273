use axum::http::Uri;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ApiConfig;

/// 分页信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pager {
    pub page: u32,
    pub page_size: u32,
    pub total_rows: usize,
}

impl Pager {
    /// 从 query 读取 page / page_size，无法解析时使用默认值
    pub fn from_uri(uri: &Uri, config: &ApiConfig) -> Self {
        let mut page = 0i64;
        let mut page_size = 0i64;
        for pair in uri.query().unwrap_or_default().split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "page" => page = value.parse().unwrap_or(0),
                "page_size" => page_size = value.parse().unwrap_or(0),
                _ => {}
            }
        }

        let page = if page <= 0 { 1 } else { page.min(u32::MAX as i64) as u32 };
        let page_size = if page_size <= 0 {
            config.default_page_size
        } else {
            (page_size.min(u32::MAX as i64) as u32).min(config.max_page_size)
        };
        Self {
            page,
            page_size,
            total_rows: 0,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }

    pub fn limit(&self) -> usize {
        self.page_size as usize
    }

    pub fn with_total(mut self, total_rows: usize) -> Self {
        self.total_rows = total_rows;
        self
    }
}
