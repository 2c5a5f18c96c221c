use std::str::FromStr;
use std::sync::Arc;

use nai_core::{ArticleStorage, Error, Result};

pub mod backends;

pub use backends::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Memory,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(StorageKind::Sqlite),
            other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl StorageKind {
    /// `sqlite` when a database URL is configured, `memory` otherwise.
    pub fn for_url(url: Option<&str>) -> Self {
        match url {
            #[cfg(feature = "sqlite")]
            Some(url) if url.starts_with("sqlite:") => StorageKind::Sqlite,
            _ => StorageKind::Memory,
        }
    }
}

pub async fn create_storage(kind: StorageKind, url: Option<&str>) -> Result<Arc<dyn ArticleStorage>> {
    let storage: Arc<dyn ArticleStorage> = match kind {
        StorageKind::Memory => Arc::new(MemoryStorage::new()),
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => {
            let url = url.unwrap_or(sqlite::DEFAULT_DATABASE_URL);
            Arc::new(SqliteStorage::connect(url).await?)
        }
    };
    tracing::info!("💾 Using {:?} storage", kind);
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_parse() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert!("postgres".parse::<StorageKind>().is_err());
        assert_eq!(StorageKind::for_url(None), StorageKind::Memory);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_kind_from_url() {
        assert_eq!("SQLite".parse::<StorageKind>().unwrap(), StorageKind::Sqlite);
        assert_eq!(StorageKind::for_url(Some("sqlite:news.db")), StorageKind::Sqlite);
    }

    #[tokio::test]
    async fn test_create_memory_storage() {
        let storage = create_storage(StorageKind::Memory, None).await.unwrap();
        assert_eq!(storage.article_count().await.unwrap(), 0);
    }
}
