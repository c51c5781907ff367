//! Storage trait definitions.
//!
//! `UserStore` is the only seam between the HTTP layer and persistence, so
//! relational and document backends can be swapped without touching handlers.

use async_trait::async_trait;

use crate::domain::User;
use crate::error::StorageResult;

/// Persistence operations for users.
///
/// Implementations are shared across concurrent requests and must be safe for
/// simultaneous callers. Cancellation is drop-based: when a request times out
/// the future returned here is dropped, so async backends stop at their next
/// await point.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a single user.
    ///
    /// Returns `StorageError::NotFound` if no user has this id.
    async fn get_by_id(&self, id: i64) -> StorageResult<User>;

    /// Store a new user and return it with its assigned id.
    ///
    /// Any id present on the input is ignored.
    async fn insert(&self, user: User) -> StorageResult<User>;

    /// Replace the user stored under `user.id`.
    ///
    /// Returns `StorageError::NotFound` if no user has this id.
    async fn update(&self, user: &User) -> StorageResult<()>;

    /// Remove a user.
    ///
    /// Returns `StorageError::NotFound` if no user has this id.
    async fn delete(&self, id: i64) -> StorageResult<()>;

    /// List all users ordered by id.
    async fn all(&self) -> StorageResult<Vec<User>>;

    /// Check if the storage backend is healthy and reachable.
    async fn health_check(&self) -> StorageResult<()>;

    /// Get the storage backend name.
    fn backend_name(&self) -> &'static str;
}
