use async_trait::async_trait;

use crate::types::{
    ArticleAction, ArticleRecord, ArticleStats, ContactMessage, NewArticleRecord, NewContact,
};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Persist an accepted pipeline result.
    async fn save_article(&self, article: &NewArticleRecord) -> Result<ArticleRecord>;

    /// Set one of the post-hoc flags. Returns false when no record has `id`.
    async fn mark_article(&self, id: i64, action: ArticleAction) -> Result<bool>;

    async fn get_article(&self, id: i64) -> Result<Option<ArticleRecord>>;

    async fn article_count(&self) -> Result<i64>;

    async fn article_stats(&self) -> Result<ArticleStats>;

    async fn save_contact(&self, contact: &NewContact) -> Result<ContactMessage>;
}

/// Out-of-band notification for new contact messages.
#[async_trait]
pub trait ContactNotifier: Send + Sync {
    async fn notify(&self, contact: &ContactMessage) -> Result<()>;
}
