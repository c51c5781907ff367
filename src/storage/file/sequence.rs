//! File-backed id sequence.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// Persisted sequence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct SequenceState {
    next_id: i64,
}

impl Default for SequenceState {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

/// Monotonic id allocator stored in a single JSON file.
///
/// Allocation takes an exclusive `flock` on the file, so several processes
/// sharing a data directory never hand out the same id.
#[derive(Debug, Clone)]
pub struct IdSequence {
    path: PathBuf,
}

impl IdSequence {
    /// Create a sequence backed by `path`. The file is created on first use.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Allocate the next id. Blocking.
    pub fn next_id(&self) -> StorageResult<i64> {
        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        file.lock_exclusive()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        let result = Self::advance(&mut file);

        file.unlock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        result
    }

    fn advance(file: &mut std::fs::File) -> StorageResult<i64> {
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let mut state: SequenceState = if contents.trim().is_empty() {
            SequenceState::default()
        } else {
            serde_json::from_str(&contents)?
        };

        let id = state.next_id;
        state.next_id += 1;

        file.seek(SeekFrom::Start(0))?;
        file.set_len(0)?;
        file.write_all(serde_json::to_string(&state)?.as_bytes())?;
        file.sync_all()?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_starts_at_one_and_increments() {
        let temp = TempDir::new().unwrap();
        let seq = IdSequence::new(temp.path().join("sequence.json"));

        assert_eq!(seq.next_id().unwrap(), 1);
        assert_eq!(seq.next_id().unwrap(), 2);
        assert_eq!(seq.next_id().unwrap(), 3);
    }

    #[test]
    fn test_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sequence.json");

        IdSequence::new(path.clone()).next_id().unwrap();
        IdSequence::new(path.clone()).next_id().unwrap();

        assert_eq!(IdSequence::new(path).next_id().unwrap(), 3);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sequence.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            IdSequence::new(path).next_id(),
            Err(StorageError::Serialization(_))
        ));
    }
}
