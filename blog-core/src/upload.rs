//! 文件上传：类型、扩展名与大小校验，以及落盘

use crate::error::{BlogError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// 上传文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Image = 1,
}

impl FileType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(FileType::Image),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub save_path: PathBuf,
    /// 对外访问前缀，如 http://127.0.0.1:8000/static
    pub server_url: String,
    /// 图片大小上限（MB）
    pub image_max_size: usize,
    /// 允许的图片扩展名（含点号）
    pub image_allow_exts: Vec<String>,
}

impl UploadPolicy {
    /// 文件名：原始文件名主干的 SHA-256 摘要 + 扩展名
    pub fn file_name(name: &str) -> String {
        let path = Path::new(name);
        let ext = file_ext(name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{:x}{}", Sha256::digest(stem.as_bytes()), ext)
    }

    pub fn check_contain_ext(&self, file_type: FileType, name: &str) -> bool {
        let ext = file_ext(name).to_lowercase();
        match file_type {
            FileType::Image => self
                .image_allow_exts
                .iter()
                .any(|allowed| allowed.to_lowercase() == ext),
        }
    }

    pub fn check_max_size(&self, file_type: FileType, size: usize) -> bool {
        match file_type {
            FileType::Image => size <= self.image_max_size * 1024 * 1024,
        }
    }

    /// 业务请求体上限（字节），给路由层配置 body limit 用
    pub fn body_limit(&self) -> usize {
        (self.image_max_size + 1) * 1024 * 1024
    }

    /// 校验并保存文件，返回对外访问地址
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn save_file(&self, file_type: FileType, name: &str, data: &[u8]) -> Result<String> {
        if !self.check_contain_ext(file_type, name) {
            return Err(BlogError::InvalidArgument(
                "file suffix is not supported".into(),
            ));
        }
        if !self.check_max_size(file_type, data.len()) {
            return Err(BlogError::InvalidArgument(
                "exceeded maximum file limit".into(),
            ));
        }

        tokio::fs::create_dir_all(&self.save_path).await?;
        let file_name = Self::file_name(name);
        tokio::fs::write(self.save_path.join(&file_name), data).await?;
        info!(file = %file_name, "file uploaded");

        Ok(format!("{}/{}", self.server_url.trim_end_matches('/'), file_name))
    }
}

fn file_ext(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}
