//! Storage backend factory.
//!
//! Creates the appropriate storage backend based on configuration.

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageResult;
use crate::storage::file::FileUserStore;
use crate::storage::memory::MemoryUserStore;
use crate::storage::redis::RedisUserStore;
use crate::storage::sql::{MySqlUserStore, PgUserStore};
use crate::storage::traits::UserStore;

/// Create a storage backend based on configuration.
///
/// The backend is health-checked before it is returned.
///
/// # Errors
///
/// Returns an error if the storage backend cannot be initialized or is unreachable.
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn UserStore>> {
    let store: Arc<dyn UserStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryUserStore::new()),
        StorageBackend::File => Arc::new(FileUserStore::new(&config.file)?),
        StorageBackend::MySQL => Arc::new(MySqlUserStore::connect(&config.mysql).await?),
        StorageBackend::PostgreSQL => Arc::new(PgUserStore::connect(&config.postgresql).await?),
        StorageBackend::Redis => Arc::new(RedisUserStore::new(&config.redis)?),
    };

    store.health_check().await?;
    tracing::info!(backend = store.backend_name(), "Storage initialized");

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_memory_storage() {
        let storage = create_storage(&StorageConfig::default()).await.unwrap();
        assert_eq!(storage.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_create_file_storage() {
        let temp_dir = TempDir::new().unwrap();

        let config = StorageConfig {
            backend: StorageBackend::File,
            file: crate::config::FileStorageConfig {
                data_dir: temp_dir.path().to_path_buf(),
            },
            ..Default::default()
        };

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_name(), "file");
    }

    #[tokio::test]
    async fn test_unreachable_redis_fails() {
        let mut config = StorageConfig {
            backend: StorageBackend::Redis,
            ..Default::default()
        };
        config.redis.url = "redis://127.0.0.1:1".to_string();

        assert!(create_storage(&config).await.is_err());
    }
}
