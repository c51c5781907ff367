//! Redis document storage backend.
//!
//! Key layout (prefix defaults to `users`):
//! ```text
//! {prefix}:next_id   INCR counter for id allocation
//! {prefix}:ids       SET of stored ids
//! {prefix}:{id}      JSON document
//! ```

use async_trait::async_trait;
use deadpool_redis::redis::{AsyncCommands, cmd, pipe};
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};

use crate::config::RedisStorageConfig;
use crate::domain::User;
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::UserStore;

/// Redis-backed user store.
pub struct RedisUserStore {
    pool: Pool,
    prefix: String,
}

impl RedisUserStore {
    /// Build the connection pool. No connection is opened until first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(config: &RedisStorageConfig) -> StorageResult<Self> {
        let mut pool_config = Config::from_url(config.url.clone());
        pool_config.pool = Some(PoolConfig::new(config.pool_size as usize));

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            prefix: config.key_prefix.clone(),
        })
    }

    fn user_key(&self, id: i64) -> String {
        format!("{}:{id}", self.prefix)
    }

    fn ids_key(&self) -> String {
        format!("{}:ids", self.prefix)
    }

    fn sequence_key(&self) -> String {
        format!("{}:next_id", self.prefix)
    }

    async fn conn(&self) -> StorageResult<Connection> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl UserStore for RedisUserStore {
    async fn get_by_id(&self, id: i64) -> StorageResult<User> {
        let mut conn = self.conn().await?;
        let doc: Option<String> = conn.get(self.user_key(id)).await?;

        match doc {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(StorageError::NotFound(id)),
        }
    }

    async fn insert(&self, user: User) -> StorageResult<User> {
        let mut conn = self.conn().await?;
        let id: i64 = conn.incr(self.sequence_key(), 1).await?;
        let user = user.with_id(id);
        let json = serde_json::to_string(&user)?;

        let (): () = pipe()
            .atomic()
            .set(self.user_key(id), json)
            .ignore()
            .sadd(self.ids_key(), id)
            .ignore()
            .query_async(&mut conn)
            .await?;

        tracing::debug!(id, "Inserted user document");
        Ok(user)
    }

    async fn update(&self, user: &User) -> StorageResult<()> {
        let mut conn = self.conn().await?;
        let json = serde_json::to_string(user)?;

        // XX only overwrites an existing key; nil means there was nothing to replace.
        let reply: Option<String> = cmd("SET")
            .arg(self.user_key(user.id))
            .arg(json)
            .arg("XX")
            .query_async(&mut conn)
            .await?;

        reply.map(|_| ()).ok_or(StorageError::NotFound(user.id))
    }

    async fn delete(&self, id: i64) -> StorageResult<()> {
        let mut conn = self.conn().await?;

        let (removed, _): (i64, i64) = pipe()
            .atomic()
            .del(self.user_key(id))
            .srem(self.ids_key(), id)
            .query_async(&mut conn)
            .await?;

        if removed == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    async fn all(&self) -> StorageResult<Vec<User>> {
        let mut conn = self.conn().await?;

        let mut ids: Vec<i64> = conn.smembers(self.ids_key()).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        ids.sort_unstable();

        let keys: Vec<String> = ids.iter().map(|&id| self.user_key(id)).collect();
        let docs: Vec<Option<String>> = cmd("MGET").arg(&keys).query_async(&mut conn).await?;

        // Documents deleted between SMEMBERS and MGET come back as nil.
        docs.into_iter()
            .flatten()
            .map(|json| serde_json::from_str(&json).map_err(StorageError::from))
            .collect()
    }

    async fn health_check(&self) -> StorageResult<()> {
        let mut conn = self.conn().await?;
        let _: String = cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
