use super::{next_id, paginate, BlogStore};
use crate::error::{BlogError, Result};
use crate::models::{NewTag, Tag, TagFilter, TagUpdate};
use chrono::Utc;
use tracing::{info, instrument};

impl BlogStore {
    async fn load_tags(&self) -> Result<Vec<Tag>> {
        Self::load(&self.tags_path()).await
    }

    /// 统计满足条件的标签数量
    #[instrument(skip(self))]
    pub async fn count_tags(&self, filter: &TagFilter) -> Result<usize> {
        let tags = self.load_tags().await?;
        Ok(tags.iter().filter(|t| filter.matches(t)).count())
    }

    /// 列出标签（按 id 升序）
    #[instrument(skip(self))]
    pub async fn list_tags(&self, filter: &TagFilter, offset: usize, limit: usize) -> Result<Vec<Tag>> {
        let mut tags: Vec<Tag> = self
            .load_tags()
            .await?
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        tags.sort_by_key(|t| t.id);
        Ok(paginate(tags, offset, limit))
    }

    pub async fn get_tag(&self, id: u32) -> Result<Tag> {
        self.load_tags()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| BlogError::NotFound(format!("tag {id}")))
    }

    #[instrument(skip(self, new))]
    pub async fn create_tag(&self, new: NewTag) -> Result<Tag> {
        let _guard = self.write_lock.lock().await;
        let mut tags = self.load_tags().await?;
        let id = next_id(tags.iter().map(|t| t.id))?;
        let tag = Tag {
            id,
            name: new.name,
            state: new.state,
            created_by: new.created_by,
            modified_by: String::new(),
            created_on: Utc::now(),
            modified_on: None,
        };
        tags.push(tag.clone());
        self.save(&self.tags_path(), &tags).await?;
        info!(tag_id = id, name = %tag.name, "tag created");
        Ok(tag)
    }

    #[instrument(skip(self, update))]
    pub async fn update_tag(&self, id: u32, update: TagUpdate) -> Result<Tag> {
        let _guard = self.write_lock.lock().await;
        let mut tags = self.load_tags().await?;
        let tag = tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| BlogError::NotFound(format!("tag {id}")))?;

        if let Some(name) = update.name.filter(|n| !n.is_empty()) {
            tag.name = name;
        }
        if let Some(state) = update.state {
            tag.state = state;
        }
        tag.modified_by = update.modified_by;
        tag.modified_on = Some(Utc::now());

        let updated = tag.clone();
        self.save(&self.tags_path(), &tags).await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_tag(&self, id: u32) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut tags = self.load_tags().await?;
        let initial_len = tags.len();
        tags.retain(|t| t.id != id);
        if tags.len() == initial_len {
            return Err(BlogError::NotFound(format!("tag {id}")));
        }
        self.save(&self.tags_path(), &tags).await?;
        info!(tag_id = id, "tag deleted");
        Ok(())
    }
}
