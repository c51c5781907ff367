//! Storage configuration.

use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process map (development/tests, not persistent).
    #[default]
    Memory,
    /// JSON document per user on the local filesystem.
    File,
    /// `MySQL` / `MariaDB` table.
    #[serde(rename = "mysql")]
    MySQL,
    /// `PostgreSQL` table.
    #[serde(rename = "postgresql")]
    PostgreSQL,
    /// JSON documents in Redis.
    Redis,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
            Self::MySQL => write!(f, "mysql"),
            Self::PostgreSQL => write!(f, "postgresql"),
            Self::Redis => write!(f, "redis"),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Storage backend type.
    #[serde(default)]
    pub backend: StorageBackend,

    /// File storage configuration.
    #[serde(default)]
    pub file: FileStorageConfig,

    /// `MySQL` storage configuration.
    #[serde(default)]
    pub mysql: SqlStorageConfig,

    /// `PostgreSQL` storage configuration.
    #[serde(default)]
    pub postgresql: SqlStorageConfig,

    /// Redis storage configuration.
    #[serde(default)]
    pub redis: RedisStorageConfig,
}

impl StorageConfig {
    /// Validate the storage configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration fields are missing for the selected backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            StorageBackend::Memory | StorageBackend::File => Ok(()),
            StorageBackend::MySQL => self.mysql.validate("mysql"),
            StorageBackend::PostgreSQL => self.postgresql.validate("postgresql"),
            StorageBackend::Redis => {
                if self.redis.url.is_empty() {
                    return Err(ConfigError::Message(
                        "storage.redis.url cannot be empty".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FileStorageConfig {
    /// Directory for storing data files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Relational (`MySQL` or `PostgreSQL`) storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SqlStorageConfig {
    /// Connection URL.
    #[serde(default)]
    pub url: String,

    /// Connection pool minimum size.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection pool maximum size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl SqlStorageConfig {
    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Message(format!(
                "storage.{section}.url cannot be empty"
            )));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::Message(format!(
                "storage.{section}.min_connections cannot exceed max_connections"
            )));
        }
        Ok(())
    }
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_connect_timeout() -> u64 {
    5
}

impl Default for SqlStorageConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

/// Redis storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisStorageConfig {
    /// Redis URL.
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size.
    #[serde(default = "default_max_connections")]
    pub pool_size: u32,

    /// Key prefix for user documents.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "users".to_string()
}

impl Default for RedisStorageConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_max_connections(),
            key_prefix: default_key_prefix(),
        }
    }
}
