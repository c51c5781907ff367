//! In-memory storage backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::User;
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::UserStore;

/// Process-local user store. Data is lost on restart.
pub struct MemoryUserStore {
    users: RwLock<BTreeMap<i64, User>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    /// Create an empty store; the first inserted user gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_by_id(&self, id: i64) -> StorageResult<User> {
        self.users
            .read()
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    async fn insert(&self, user: User) -> StorageResult<User> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = user.with_id(id);
        self.users.write().insert(id, user.clone());
        tracing::debug!(id, "Inserted user");
        Ok(user)
    }

    async fn update(&self, user: &User) -> StorageResult<()> {
        let mut users = self.users.write();
        let slot = users
            .get_mut(&user.id)
            .ok_or(StorageError::NotFound(user.id))?;
        slot.clone_from(user);
        Ok(())
    }

    async fn delete(&self, id: i64) -> StorageResult<()> {
        self.users
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound(id))
    }

    async fn all(&self) -> StorageResult<Vec<User>> {
        Ok(self.users.read().values().cloned().collect())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryUserStore::new();

        let alice = store.insert(User::new("Alice").with_id(99)).await.unwrap();
        let bob = store.insert(User::new("Bob")).await.unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(store.get_by_id(1).await.unwrap(), alice);
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let store = MemoryUserStore::new();
        let user = store.insert(User::new("Alice")).await.unwrap();

        let replacement = User::new("Alicia")
            .with_email("alicia@example.com")
            .with_id(user.id);
        store.update(&replacement).await.unwrap();

        assert_eq!(store.get_by_id(user.id).await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let store = MemoryUserStore::new();

        assert!(matches!(
            store.get_by_id(1).await,
            Err(StorageError::NotFound(1))
        ));
        assert!(matches!(
            store.update(&User::new("x").with_id(5)).await,
            Err(StorageError::NotFound(5))
        ));
        assert!(matches!(
            store.delete(3).await,
            Err(StorageError::NotFound(3))
        ));
    }

    #[tokio::test]
    async fn test_all_is_ordered_and_reflects_deletes() {
        let store = MemoryUserStore::new();
        assert!(store.all().await.unwrap().is_empty());

        for name in ["a", "b", "c"] {
            store.insert(User::new(name)).await.unwrap();
        }
        store.delete(2).await.unwrap();

        let ids: Vec<i64> = store.all().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_unique_ids() {
        let store = Arc::new(MemoryUserStore::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(User::new(format!("u{i}"))).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let users = store.all().await.unwrap();
        assert_eq!(users.len(), 32);
        assert_eq!(users.last().unwrap().id, 32);
    }
}
