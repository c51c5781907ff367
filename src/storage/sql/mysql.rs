//! `MySQL` / `MariaDB` storage backend.

use async_trait::async_trait;
use sqlx::MySqlPool;

use super::{SELECT_COLUMNS, UserRow, pool_options, row_to_user};
use crate::config::SqlStorageConfig;
use crate::domain::User;
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::UserStore;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL DEFAULT '',
    email VARCHAR(255) NULL
)";

/// `MySQL`-backed user store.
pub struct MySqlUserStore {
    pool: MySqlPool,
}

impl MySqlUserStore {
    /// Connect, then create the `users` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or the schema cannot be created.
    pub async fn connect(config: &SqlStorageConfig) -> StorageResult<Self> {
        let pool = pool_options::<sqlx::MySql>(config)
            .connect(&config.url)
            .await?;

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Wrap an existing pool without touching the schema.
    #[must_use]
    pub const fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn ensure_schema(&self) -> StorageResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn exists(&self, id: i64) -> StorageResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl UserStore for MySqlUserStore {
    async fn get_by_id(&self, id: i64) -> StorageResult<User> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(row_to_user).ok_or(StorageError::NotFound(id))
    }

    async fn insert(&self, user: User) -> StorageResult<User> {
        let result = sqlx::query("INSERT INTO users (name, email) VALUES (?, ?)")
            .bind(&user.name)
            .bind(&user.email)
            .execute(&self.pool)
            .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| StorageError::Query(format!("assigned id out of range: {e}")))?;

        tracing::debug!(id, "Inserted user row");
        Ok(user.with_id(id))
    }

    async fn update(&self, user: &User) -> StorageResult<()> {
        let result = sqlx::query("UPDATE users SET name = ?, email = ? WHERE id = ?")
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        // MySQL reports changed rows, so an identical replace also yields 0.
        if result.rows_affected() == 0 && !self.exists(user.id).await? {
            return Err(StorageError::NotFound(user.id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    async fn all(&self) -> StorageResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM users ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mysql"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sqlx::mysql::MySqlPoolOptions;

    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_fails_health_check() {
        let pool = MySqlPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("mysql://root@127.0.0.1:1/users")
            .unwrap();
        let store = MySqlUserStore::from_pool(pool);

        assert_eq!(store.backend_name(), "mysql");
        assert!(store.health_check().await.is_err());
    }
}
