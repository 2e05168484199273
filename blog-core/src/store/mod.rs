use crate::error::{BlogError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

mod articles;
mod tags;

/// 基于本地 JSON 文件的博客存储：<data_dir>/tags.json 与 <data_dir>/articles.json。
#[derive(Debug, Clone)]
pub struct BlogStore {
    data_dir: PathBuf,
    /// 串行化 读-改-写，防止并发请求互相覆盖
    write_lock: Arc<Mutex<()>>,
}

impl BlogStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 确保数据目录存在。
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    fn tags_path(&self) -> PathBuf {
        self.data_dir.join("tags.json")
    }

    fn articles_path(&self) -> PathBuf {
        self.data_dir.join("articles.json")
    }

    async fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(vec![]);
        }
        let data = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn save<T: Serialize>(&self, path: &Path, rows: &[T]) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let data = serde_json::to_vec(rows)?;
        // 先写临时文件再 rename，读者只会看到完整的旧文件或新文件
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

/// 下一个自增 id
fn next_id(ids: impl Iterator<Item = u32>) -> Result<u32> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| BlogError::Other("id space exhausted".into()))
}

/// 按 offset/limit 截取；limit 为 0 时不截断
fn paginate<T>(rows: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    let iter = rows.into_iter().skip(offset);
    if limit == 0 {
        iter.collect()
    } else {
        iter.take(limit).collect()
    }
}
