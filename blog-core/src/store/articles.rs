use super::{next_id, paginate, BlogStore};
use crate::error::{BlogError, Result};
use crate::models::{Article, ArticleDetail, ArticleFilter, ArticleUpdate, NewArticle};
use chrono::Utc;
use tracing::{info, instrument};

impl BlogStore {
    async fn load_articles(&self) -> Result<Vec<Article>> {
        Self::load(&self.articles_path()).await
    }

    /// 获取文章详情，同时解析其标签（标签已删除时为 None）
    #[instrument(skip(self))]
    pub async fn get_article(&self, id: u32) -> Result<ArticleDetail> {
        let article = self
            .load_articles()
            .await?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| BlogError::NotFound(format!("article {id}")))?;
        let tag = match self.get_tag(article.tag_id).await {
            Ok(tag) => Some(tag),
            Err(BlogError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(ArticleDetail { article, tag })
    }

    #[instrument(skip(self))]
    pub async fn count_articles(&self, filter: &ArticleFilter) -> Result<usize> {
        let articles = self.load_articles().await?;
        Ok(articles.iter().filter(|a| filter.matches(a)).count())
    }

    #[instrument(skip(self))]
    pub async fn list_articles(
        &self,
        filter: &ArticleFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Article>> {
        let mut articles: Vec<Article> = self
            .load_articles()
            .await?
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect();
        articles.sort_by_key(|a| a.id);
        Ok(paginate(articles, offset, limit))
    }

    /// 创建文章；所属标签必须存在
    #[instrument(skip(self, new))]
    pub async fn create_article(&self, new: NewArticle) -> Result<Article> {
        let _guard = self.write_lock.lock().await;
        // 持锁检查标签，避免与 delete_tag 交错
        self.get_tag(new.tag_id).await?;
        let mut articles = self.load_articles().await?;
        let id = next_id(articles.iter().map(|a| a.id))?;
        let article = Article {
            id,
            tag_id: new.tag_id,
            title: new.title,
            desc: new.desc,
            content: new.content,
            cover_image_url: new.cover_image_url,
            state: new.state,
            created_by: new.created_by,
            modified_by: String::new(),
            created_on: Utc::now(),
            modified_on: None,
        };
        articles.push(article.clone());
        self.save(&self.articles_path(), &articles).await?;
        info!(article_id = id, tag_id = article.tag_id, "article created");
        Ok(article)
    }

    #[instrument(skip(self, update))]
    pub async fn update_article(&self, id: u32, update: ArticleUpdate) -> Result<Article> {
        let _guard = self.write_lock.lock().await;
        if let Some(tag_id) = update.tag_id {
            self.get_tag(tag_id).await?;
        }
        let mut articles = self.load_articles().await?;
        let article = articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| BlogError::NotFound(format!("article {id}")))?;

        if let Some(tag_id) = update.tag_id {
            article.tag_id = tag_id;
        }
        if let Some(title) = update.title.filter(|s| !s.is_empty()) {
            article.title = title;
        }
        if let Some(desc) = update.desc.filter(|s| !s.is_empty()) {
            article.desc = desc;
        }
        if let Some(content) = update.content.filter(|s| !s.is_empty()) {
            article.content = content;
        }
        if let Some(url) = update.cover_image_url.filter(|s| !s.is_empty()) {
            article.cover_image_url = url;
        }
        if let Some(state) = update.state {
            article.state = state;
        }
        article.modified_by = update.modified_by;
        article.modified_on = Some(Utc::now());

        let updated = article.clone();
        self.save(&self.articles_path(), &articles).await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_article(&self, id: u32) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut articles = self.load_articles().await?;
        let initial_len = articles.len();
        articles.retain(|a| a.id != id);
        if articles.len() == initial_len {
            return Err(BlogError::NotFound(format!("article {id}")));
        }
        self.save(&self.articles_path(), &articles).await?;
        info!(article_id = id, "article deleted");
        Ok(())
    }
}
