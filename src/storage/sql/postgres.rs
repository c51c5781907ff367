//! `PostgreSQL` storage backend.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{SELECT_COLUMNS, UserRow, pool_options, row_to_user};
use crate::config::SqlStorageConfig;
use crate::domain::User;
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::UserStore;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    email TEXT
)";

/// `PostgreSQL`-backed user store.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Connect, then create the `users` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or the schema cannot be created.
    pub async fn connect(config: &SqlStorageConfig) -> StorageResult<Self> {
        let pool = pool_options::<sqlx::Postgres>(config)
            .connect(&config.url)
            .await?;

        let store = Self::from_pool(pool);
        sqlx::query(CREATE_TABLE).execute(&store.pool).await?;
        Ok(store)
    }

    /// Wrap an existing pool without touching the schema.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_id(&self, id: i64) -> StorageResult<User> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(row_to_user).ok_or(StorageError::NotFound(id))
    }

    async fn insert(&self, user: User) -> StorageResult<User> {
        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id")
                .bind(&user.name)
                .bind(&user.email)
                .fetch_one(&self.pool)
                .await?;

        tracing::debug!(id, "Inserted user row");
        Ok(user.with_id(id))
    }

    async fn update(&self, user: &User) -> StorageResult<()> {
        let result = sqlx::query("UPDATE users SET name = $1, email = $2 WHERE id = $3")
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(user.id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
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
        "postgresql"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sqlx::postgres::PgPoolOptions;

    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_fails_health_check() {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://postgres@127.0.0.1:1/users")
            .unwrap();
        let store = PgUserStore::from_pool(pool);

        assert_eq!(store.backend_name(), "postgresql");
        assert!(store.health_check().await.is_err());
    }
}
