//! File-based storage backend.
//!
//! Stores each user as a JSON document. Suitable for development and
//! single-node deployments.
//!
//! Directory structure:
//! ```text
//! data/
//! ├── sequence.json
//! └── users/
//!     └── {id}.json
//! ```

mod sequence;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::FileStorageConfig;
use crate::domain::User;
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::UserStore;

pub use sequence::IdSequence;

/// File-based user store.
pub struct FileUserStore {
    /// Directory holding one document per user.
    users_dir: Arc<PathBuf>,
    /// Id allocator.
    sequence: IdSequence,
    /// Serializes writers within this process.
    write_lock: Mutex<()>,
}

impl FileUserStore {
    /// Create a new file store.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directories cannot be created.
    pub fn new(config: &FileStorageConfig) -> StorageResult<Self> {
        let base_dir = &config.data_dir;
        let users_dir = base_dir.join("users");

        std::fs::create_dir_all(&users_dir).map_err(|e| {
            StorageError::FileIO(format!("Failed to create directory {}: {e}", users_dir.display()))
        })?;

        Ok(Self {
            users_dir: Arc::new(users_dir),
            sequence: IdSequence::new(base_dir.join("sequence.json")),
            write_lock: Mutex::new(()),
        })
    }

    /// Run blocking filesystem work off the async executor.
    async fn blocking<T, F>(f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> StorageResult<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| StorageError::FileIO(e.to_string()))?
    }
}

fn document_path(dir: &Path, id: i64) -> PathBuf {
    dir.join(format!("{id}.json"))
}

fn read_document(path: &Path, id: i64) -> StorageResult<User> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(id)),
        Err(e) => Err(e.into()),
    }
}

/// Write via a temp file and rename so readers never see a partial document.
fn write_document(dir: &Path, user: &User) -> StorageResult<()> {
    let path = document_path(dir, user.id);
    let tmp = path.with_extension("json.tmp");

    let file = std::fs::File::create(&tmp)?;
    serde_json::to_writer(&file, user)?;
    file.sync_all()?;
    std::fs::rename(&tmp, &path)?;

    Ok(())
}

/// Parse `{id}.json`; anything else in the directory is ignored.
fn id_from_path(path: &Path) -> Option<i64> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn get_by_id(&self, id: i64) -> StorageResult<User> {
        let dir = Arc::clone(&self.users_dir);
        Self::blocking(move || read_document(&document_path(&dir, id), id)).await
    }

    async fn insert(&self, user: User) -> StorageResult<User> {
        let _guard = self.write_lock.lock().await;
        let dir = Arc::clone(&self.users_dir);
        let sequence = self.sequence.clone();

        let user = Self::blocking(move || {
            let user = user.with_id(sequence.next_id()?);
            write_document(&dir, &user)?;
            Ok(user)
        })
        .await?;

        tracing::debug!(id = user.id, "Inserted user document");
        Ok(user)
    }

    async fn update(&self, user: &User) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let dir = Arc::clone(&self.users_dir);
        let user = user.clone();

        Self::blocking(move || {
            if !document_path(&dir, user.id).exists() {
                return Err(StorageError::NotFound(user.id));
            }
            write_document(&dir, &user)
        })
        .await
    }

    async fn delete(&self, id: i64) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let dir = Arc::clone(&self.users_dir);

        Self::blocking(move || match std::fs::remove_file(document_path(&dir, id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(id)),
            Err(e) => Err(e.into()),
        })
        .await
    }

    async fn all(&self) -> StorageResult<Vec<User>> {
        let dir = Arc::clone(&self.users_dir);

        Self::blocking(move || {
            let mut users = Vec::new();

            for entry in std::fs::read_dir(dir.as_path())? {
                let path = entry?.path();
                let Some(id) = id_from_path(&path) else {
                    continue;
                };

                match read_document(&path, id) {
                    Ok(user) => users.push(user),
                    // Deleted between listing and reading.
                    Err(StorageError::NotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }

            users.sort_by_key(|u| u.id);
            Ok(users)
        })
        .await
    }

    async fn health_check(&self) -> StorageResult<()> {
        let dir = Arc::clone(&self.users_dir);

        Self::blocking(move || {
            if dir.is_dir() {
                Ok(())
            } else {
                Err(StorageError::Unavailable)
            }
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (FileUserStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = FileStorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
        };
        (FileUserStore::new(&config).unwrap(), temp_dir)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (store, _temp) = create_test_store();

        let user = store
            .insert(User::new("Alice").with_email("alice@example.com"))
            .await
            .unwrap();
        assert_eq!(user.id, 1);

        let loaded = store.get_by_id(1).await.unwrap();
        assert_eq!(loaded, user);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (store, _temp) = create_test_store();
        let user = store.insert(User::new("Alice")).await.unwrap();

        let renamed = User::new("Alicia").with_id(user.id);
        store.update(&renamed).await.unwrap();
        assert_eq!(store.get_by_id(user.id).await.unwrap().name, "Alicia");

        store.delete(user.id).await.unwrap();
        assert!(matches!(
            store.get_by_id(user.id).await,
            Err(StorageError::NotFound(1))
        ));
        assert!(matches!(
            store.delete(user.id).await,
            Err(StorageError::NotFound(1))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_does_not_create() {
        let (store, _temp) = create_test_store();

        let result = store.update(&User::new("ghost").with_id(42)).await;
        assert!(matches!(result, Err(StorageError::NotFound(42))));
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_sorted_and_ignores_foreign_files() {
        let (store, temp) = create_test_store();

        for name in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"] {
            store.insert(User::new(name)).await.unwrap();
        }
        std::fs::write(temp.path().join("users/notes.txt"), "hello").unwrap();

        let ids: Vec<i64> = store.all().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, (1..=11).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_ids_persist_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let config = FileStorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
        };

        FileUserStore::new(&config)
            .unwrap()
            .insert(User::new("first"))
            .await
            .unwrap();

        let store = FileUserStore::new(&config).unwrap();
        let second = store.insert(User::new("second")).await.unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(store.all().await.unwrap().len(), 2);
    }

    #[test]
    fn test_id_from_path() {
        assert_eq!(id_from_path(Path::new("/d/12.json")), Some(12));
        assert_eq!(id_from_path(Path::new("/d/12.json.tmp")), None);
        assert_eq!(id_from_path(Path::new("/d/abc.json")), None);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (store, _temp) = create_test_store();
        assert!(store.health_check().await.is_ok());
        assert_eq!(store.backend_name(), "file");
    }
}
