use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use nai_core::{
    ArticleAction, ArticleRecord, ArticleStats, ArticleStorage, ContactMessage, NewArticleRecord,
    NewContact, Result,
};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: Vec<ArticleRecord>,
    contacts: Vec<ContactMessage>,
}

impl MemoryStore {
    fn save_article(&mut self, article: &NewArticleRecord) -> ArticleRecord {
        let record = ArticleRecord {
            id: self.articles.len() as i64 + 1,
            original_article: article.original_article.clone(),
            english_summary: article.english_summary.clone(),
            arabic_summary: article.arabic_summary.clone(),
            copied: false,
            discarded: false,
            created_at: Utc::now(),
        };
        self.articles.push(record.clone());
        record
    }

    fn mark_article(&mut self, id: i64, action: ArticleAction) -> bool {
        match self.articles.iter_mut().find(|a| a.id == id) {
            Some(record) => {
                match action {
                    ArticleAction::Copied => record.copied = true,
                    ArticleAction::Discarded => record.discarded = true,
                }
                true
            }
            None => false,
        }
    }

    fn save_contact(&mut self, contact: &NewContact) -> ContactMessage {
        let message = ContactMessage {
            id: self.contacts.len() as i64 + 1,
            name: contact.name.clone(),
            email: contact.email.clone(),
            message: contact.message.clone(),
            read: false,
            created_at: Utc::now(),
        };
        self.contacts.push(message.clone());
        message
    }
}

/// Process-local storage; records are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contacts(&self) -> Vec<ContactMessage> {
        self.store.read().await.contacts.clone()
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn save_article(&self, article: &NewArticleRecord) -> Result<ArticleRecord> {
        article.validate()?;
        let mut store = self.store.write().await;
        Ok(store.save_article(article))
    }

    async fn mark_article(&self, id: i64, action: ArticleAction) -> Result<bool> {
        let mut store = self.store.write().await;
        Ok(store.mark_article(id, action))
    }

    async fn get_article(&self, id: i64) -> Result<Option<ArticleRecord>> {
        let store = self.store.read().await;
        Ok(store.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn article_count(&self) -> Result<i64> {
        Ok(self.store.read().await.articles.len() as i64)
    }

    async fn article_stats(&self) -> Result<ArticleStats> {
        let store = self.store.read().await;
        let copied = store.articles.iter().filter(|a| a.copied).count();
        Ok(ArticleStats::new(store.articles.len() as i64, copied as i64))
    }

    async fn save_contact(&self, contact: &NewContact) -> Result<ContactMessage> {
        let mut store = self.store.write().await;
        Ok(store.save_contact(contact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize) -> NewArticleRecord {
        NewArticleRecord {
            original_article: format!("Article {}", n),
            english_summary: format!("Summary {}", n),
            arabic_summary: format!("ملخص {}", n),
        }
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        let first = storage.save_article(&record(1)).await.unwrap();
        let second = storage.save_article(&record(2)).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));
        assert!(!first.copied && !first.discarded);
        assert_eq!(storage.article_count().await.unwrap(), 2);

        assert!(storage.mark_article(2, ArticleAction::Copied).await.unwrap());
        assert!(storage.mark_article(1, ArticleAction::Discarded).await.unwrap());
        assert!(!storage.mark_article(99, ArticleAction::Copied).await.unwrap());

        let stored = storage.get_article(2).await.unwrap().unwrap();
        assert!(stored.copied);
        assert!(!stored.discarded);

        let stats = storage.article_stats().await.unwrap();
        assert_eq!((stats.total, stats.copied), (2, 1));
        assert_eq!(stats.rate, 50.0);
    }

    #[tokio::test]
    async fn test_rejects_incomplete_record() {
        let storage = MemoryStorage::new();
        let mut incomplete = record(1);
        incomplete.arabic_summary.clear();
        assert!(storage.save_article(&incomplete).await.is_err());
        assert_eq!(storage.article_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_contacts_are_unread() {
        let storage = MemoryStorage::new();
        let contact = NewContact::parse("Ana", "ana@example.com", "Hello from the tests").unwrap();
        let saved = storage.save_contact(&contact).await.unwrap();
        assert_eq!(saved.id, 1);
        assert!(!saved.read);
        assert_eq!(storage.contacts().await.len(), 1);
    }
}
