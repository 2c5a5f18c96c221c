use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nai_core::{
    ArticleAction, ArticleRecord, ArticleStats, ArticleStorage, ContactMessage, Error,
    NewArticleRecord, NewContact, Result,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:news_ai.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        original_article TEXT NOT NULL,
        english_summary TEXT NOT NULL,
        arabic_summary TEXT NOT NULL,
        copied INTEGER NOT NULL DEFAULT 0,
        discarded INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        message TEXT NOT NULL,
        read INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_contacts_created_at ON contacts (created_at DESC)",
];

fn storage_error(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

fn parse_timestamp(value: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| storage_error("Failed to parse timestamp", e))
}

fn article_from_row(row: &SqliteRow) -> Result<ArticleRecord> {
    Ok(ArticleRecord {
        id: row.get("id"),
        original_article: row.get("original_article"),
        english_summary: row.get("english_summary"),
        arabic_summary: row.get("arabic_summary"),
        copied: row.get("copied"),
        discarded: row.get("discarded"),
        created_at: parse_timestamp(row.get("created_at"))?,
    })
}

pub struct SqliteStorage {
    pool: SqlitePool,
    url: String,
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage").field("url", &self.url).finish()
    }
}

impl SqliteStorage {
    /// Connects to `url` (e.g. `sqlite:news_ai.db`), creating the database
    /// file if needed, and runs the migrations.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| storage_error("Invalid database URL", e))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| storage_error(&format!("Failed to run migration {}", i), e))?;
        }

        tracing::debug!("Connected to {}", url);
        Ok(Self {
            pool,
            url: url.to_string(),
        })
    }

    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::connect(&format!("sqlite:{}", db_path.display())).await
    }
}

#[async_trait]
impl ArticleStorage for SqliteStorage {
    async fn save_article(&self, article: &NewArticleRecord) -> Result<ArticleRecord> {
        article.validate()?;
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO articles (original_article, english_summary, arabic_summary, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&article.original_article)
        .bind(&article.english_summary)
        .bind(&article.arabic_summary)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to save article", e))?;

        Ok(ArticleRecord {
            id: result.last_insert_rowid(),
            original_article: article.original_article.clone(),
            english_summary: article.english_summary.clone(),
            arabic_summary: article.arabic_summary.clone(),
            copied: false,
            discarded: false,
            created_at,
        })
    }

    async fn mark_article(&self, id: i64, action: ArticleAction) -> Result<bool> {
        let query = match action {
            ArticleAction::Copied => "UPDATE articles SET copied = 1 WHERE id = ?",
            ArticleAction::Discarded => "UPDATE articles SET discarded = 1 WHERE id = ?",
        };
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to update article", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_article(&self, id: i64) -> Result<Option<ArticleRecord>> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to load article", e))?;
        row.as_ref().map(article_from_row).transpose()
    }

    async fn article_count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to count articles", e))?;
        Ok(row.get("count"))
    }

    async fn article_stats(&self) -> Result<ArticleStats> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, COALESCE(SUM(copied), 0) AS copied FROM articles",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to compute article stats", e))?;
        Ok(ArticleStats::new(row.get("total"), row.get("copied")))
    }

    async fn save_contact(&self, contact: &NewContact) -> Result<ContactMessage> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO contacts (name, email, message, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.message)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to save contact", e))?;

        Ok(ContactMessage {
            id: result.last_insert_rowid(),
            name: contact.name.clone(),
            email: contact.email.clone(),
            message: contact.message.clone(),
            read: false,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record() -> NewArticleRecord {
        NewArticleRecord {
            original_article: "Lumen\n\nAcme unveiled Lumen.".to_string(),
            english_summary: "Lumen\n\nAcme built Lumen.".to_string(),
            arabic_summary: "لومن".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");
        let storage = SqliteStorage::new_with_path(&db_path).await.unwrap();
        assert!(db_path.exists());

        assert_eq!(storage.article_stats().await.unwrap().rate, 0.0);

        let saved = storage.save_article(&record()).await.unwrap();
        storage.save_article(&record()).await.unwrap();
        assert_eq!(storage.article_count().await.unwrap(), 2);

        assert!(storage.mark_article(saved.id, ArticleAction::Copied).await.unwrap());
        assert!(!storage.mark_article(404, ArticleAction::Discarded).await.unwrap());

        let loaded = storage.get_article(saved.id).await.unwrap().unwrap();
        assert!(loaded.copied);
        assert!(!loaded.discarded);
        assert_eq!(loaded.arabic_summary, "لومن");
        assert!(storage.get_article(404).await.unwrap().is_none());

        let stats = storage.article_stats().await.unwrap();
        assert_eq!((stats.total, stats.copied), (2, 1));
        assert_eq!(stats.rate, 50.0);
    }

    #[tokio::test]
    async fn test_records_survive_reconnect() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        {
            let storage = SqliteStorage::new_with_path(&db_path).await.unwrap();
            storage.save_article(&record()).await.unwrap();
            let contact = NewContact::parse("Ana", "ana@example.com", "Hello from the tests").unwrap();
            let saved = storage.save_contact(&contact).await.unwrap();
            assert!(!saved.read);
        }
        let storage = SqliteStorage::new_with_path(&db_path).await.unwrap();
        assert_eq!(storage.article_count().await.unwrap(), 1);
    }
}
